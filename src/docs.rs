use crate::api::bank_account::CreateBankAccount;
use crate::api::employee::{
    CreateEmployee, EmployeeDetailResponse, EmployeeListResponse, EmployeeQuery, UpdateEmployee,
};
use crate::api::monthly_salary::GenerateMonthlySalary;
use crate::api::salary_component::{CreateComponent, UpdateComponent};
use crate::api::salary_structure::{StructureDetailResponse, StructureQuery};
use crate::model::bank_account::BankAccount;
use crate::model::employee::Employee;
use crate::model::monthly_salary::{MonthlySalary, MonthlySalaryLine};
use crate::model::salary_component::{ComponentType, SalaryComponent};
use crate::model::salary_structure::{SalaryStructure, StructureLineDetail};
use crate::payroll::generator::MonthlySalaryBreakdown;
use crate::payroll::structure::{ComponentAmount, NewSalaryStructure};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Payroll Administration API",
        version = "1.0.0",
        description = r#"
## Payroll Administration

This API manages employees, their bank accounts, reusable salary
components, versioned per-employee salary structures, and generated
monthly salaries with line-item breakdowns.

### Key Features
- **Employee Management**
  - Create, update, list, and view employees with their active structure
- **Bank Accounts**
  - At most one primary account per employee, enforced on save
- **Salary Structures**
  - Versioned structures, at most one active per employee; creating a new
    active structure end-dates and supersedes the previous one
- **Monthly Salary Generation**
  - One immutable salary per (employee, month, year) with resolved
    earning/deduction lines

### Response Format
- JSON-based RESTful responses
- Pagination supported for the employee list

---
Built with **Rust**, **Actix Web**, **SQLx**, and **Utoipa**.
"#,
    ),
    paths(
        crate::api::employee::create_employee,
        crate::api::employee::list_employees,
        crate::api::employee::get_employee,
        crate::api::employee::update_employee,
        crate::api::employee::delete_employee,

        crate::api::bank_account::create_bank_account,
        crate::api::bank_account::list_bank_accounts,

        crate::api::salary_component::create_component,
        crate::api::salary_component::list_components,
        crate::api::salary_component::get_component,
        crate::api::salary_component::update_component,
        crate::api::salary_component::delete_component,

        crate::api::salary_structure::create_salary_structure,
        crate::api::salary_structure::list_salary_structures,
        crate::api::salary_structure::get_salary_structure,
        crate::api::salary_structure::activate,

        crate::api::monthly_salary::generate_monthly_salary,
        crate::api::monthly_salary::list_monthly_salaries,
        crate::api::monthly_salary::get_monthly_salary
    ),
    components(
        schemas(
            Employee,
            CreateEmployee,
            UpdateEmployee,
            EmployeeQuery,
            EmployeeListResponse,
            EmployeeDetailResponse,
            BankAccount,
            CreateBankAccount,
            ComponentType,
            SalaryComponent,
            CreateComponent,
            UpdateComponent,
            SalaryStructure,
            StructureLineDetail,
            StructureQuery,
            StructureDetailResponse,
            NewSalaryStructure,
            ComponentAmount,
            MonthlySalary,
            MonthlySalaryLine,
            MonthlySalaryBreakdown,
            GenerateMonthlySalary
        )
    ),
    tags(
        (name = "Employee", description = "Employee management APIs"),
        (name = "BankAccount", description = "Bank account APIs"),
        (name = "SalaryComponent", description = "Reusable earning/deduction definitions"),
        (name = "SalaryStructure", description = "Versioned salary structure APIs"),
        (name = "MonthlySalary", description = "Monthly salary generation APIs"),
    )
)]
pub struct ApiDoc;
