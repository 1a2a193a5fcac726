pub mod bank_account;
pub mod employee;
pub mod monthly_salary;
pub mod salary_component;
pub mod salary_structure;
