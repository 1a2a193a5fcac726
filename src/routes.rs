use crate::{
    api::{bank_account, employee, monthly_salary, salary_component, salary_structure},
    config::Config,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/employees")
                    // /employees
                    .service(
                        web::resource("")
                            .route(web::post().to(employee::create_employee))
                            .route(web::get().to(employee::list_employees)),
                    )
                    // /employees/{employee_id}
                    .service(
                        web::resource("/{employee_id}")
                            .route(web::get().to(employee::get_employee))
                            .route(web::put().to(employee::update_employee))
                            .route(web::delete().to(employee::delete_employee)),
                    )
                    // /employees/{employee_id}/bank-accounts
                    .service(
                        web::resource("/{employee_id}/bank-accounts")
                            .route(web::post().to(bank_account::create_bank_account))
                            .route(web::get().to(bank_account::list_bank_accounts)),
                    )
                    // /employees/{employee_id}/salary-structures
                    .service(
                        web::resource("/{employee_id}/salary-structures")
                            .route(web::post().to(salary_structure::create_salary_structure))
                            .route(web::get().to(salary_structure::list_salary_structures)),
                    )
                    // /employees/{employee_id}/monthly-salaries
                    .service(
                        web::resource("/{employee_id}/monthly-salaries")
                            .route(web::post().to(monthly_salary::generate_monthly_salary))
                            .route(web::get().to(monthly_salary::list_monthly_salaries)),
                    ),
            )
            .service(
                web::scope("/components")
                    // /components
                    .service(
                        web::resource("")
                            .route(web::post().to(salary_component::create_component))
                            .route(web::get().to(salary_component::list_components)),
                    )
                    // /components/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(salary_component::get_component))
                            .route(web::put().to(salary_component::update_component))
                            .route(web::delete().to(salary_component::delete_component)),
                    ),
            )
            .service(
                web::scope("/salary-structures")
                    // /salary-structures/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(salary_structure::get_salary_structure)),
                    )
                    // /salary-structures/{id}/activate
                    .service(
                        web::resource("/{id}/activate")
                            .route(web::post().to(salary_structure::activate)),
                    ),
            )
            .service(
                web::scope("/monthly-salaries")
                    // /monthly-salaries/{id}
                    .service(
                        web::resource("/{id}")
                            .route(web::get().to(monthly_salary::get_monthly_salary)),
                    ),
            ),
    );
}
