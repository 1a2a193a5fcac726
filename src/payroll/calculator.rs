//! Pure salary arithmetic over a structure's basic pay and its lines.
//! No rounding happens here; amounts are rounded to 2 decimal places only
//! when persisted.

use std::collections::HashMap;

use rust_decimal::Decimal;

use crate::model::salary_component::ComponentType;
use crate::model::salary_structure::StructureLineDetail;

/// Percentage lines resolve against `basic_pay`; fixed lines pass through
/// unchanged.
pub fn resolve_amount(basic_pay: Decimal, line: &StructureLineDetail) -> Decimal {
    if line.is_percentage {
        basic_pay * line.amount / Decimal::ONE_HUNDRED
    } else {
        line.amount
    }
}

/// Resolved amount keyed by component code.
pub fn calculate_component_amounts(
    basic_pay: Decimal,
    lines: &[StructureLineDetail],
) -> HashMap<String, Decimal> {
    lines
        .iter()
        .map(|line| (line.code.clone(), resolve_amount(basic_pay, line)))
        .collect()
}

/// Basic pay plus every resolved line. Deduction lines are summed in as
/// well; the generator keeps its own earnings-only gross.
pub fn gross_salary(basic_pay: Decimal, lines: &[StructureLineDetail]) -> Decimal {
    let total_components: Decimal = lines
        .iter()
        .map(|line| resolve_amount(basic_pay, line))
        .sum();
    basic_pay + total_components
}

/// Gross minus the resolved deduction lines.
pub fn net_salary(basic_pay: Decimal, lines: &[StructureLineDetail]) -> Decimal {
    let total_deductions: Decimal = lines
        .iter()
        .filter(|line| line.component_type == ComponentType::Deduction)
        .map(|line| resolve_amount(basic_pay, line))
        .sum();
    gross_salary(basic_pay, lines) - total_deductions
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(
        code: &str,
        name: &str,
        component_type: ComponentType,
        is_percentage: bool,
        amount: Decimal,
    ) -> StructureLineDetail {
        StructureLineDetail {
            line_id: 0,
            salary_component_id: 0,
            code: code.to_string(),
            name: name.to_string(),
            component_type,
            is_percentage,
            amount,
        }
    }

    #[test]
    fn percentage_line_resolves_against_basic() {
        let l = line("HRA", "HRA", ComponentType::Earning, true, dec!(10));
        assert_eq!(resolve_amount(dec!(50000), &l), dec!(5000.00));
    }

    #[test]
    fn fixed_line_ignores_basic() {
        let l = line("CONV", "Conveyance", ComponentType::Earning, false, dec!(2000));
        assert_eq!(resolve_amount(dec!(50000), &l), dec!(2000.00));
        assert_eq!(resolve_amount(dec!(0), &l), dec!(2000.00));
    }

    #[test]
    fn component_amounts_are_keyed_by_code() {
        let lines = vec![
            line("HRA", "HRA", ComponentType::Earning, true, dec!(40)),
            line("CONV", "Conveyance", ComponentType::Earning, false, dec!(1500)),
        ];
        let amounts = calculate_component_amounts(dec!(30000), &lines);
        assert_eq!(amounts["HRA"], dec!(12000.00));
        assert_eq!(amounts["CONV"], dec!(1500));
    }

    #[test]
    fn gross_sums_every_line_including_deductions() {
        let lines = vec![
            line("HRA", "HRA", ComponentType::Earning, false, dec!(5000)),
            line("TAX", "Tax", ComponentType::Deduction, false, dec!(1000)),
        ];
        assert_eq!(gross_salary(dec!(30000), &lines), dec!(36000));
    }

    #[test]
    fn net_subtracts_resolved_deductions_from_gross() {
        let lines = vec![
            line("HRA", "HRA", ComponentType::Earning, false, dec!(5000)),
            line("TAX", "Tax", ComponentType::Deduction, true, dec!(10)),
        ];
        // gross = 30000 + 5000 + 3000, net = gross - 3000
        assert_eq!(net_salary(dec!(30000), &lines), dec!(35000.00));
    }

    #[test]
    fn gross_of_empty_structure_is_basic_pay() {
        assert_eq!(gross_salary(dec!(30000), &[]), dec!(30000));
        assert_eq!(net_salary(dec!(30000), &[]), dec!(30000));
    }

    #[test]
    fn percentage_precision_is_not_truncated() {
        let l = line("PF", "PF", ComponentType::Deduction, true, dec!(12.5));
        // 33333 * 12.5 / 100 keeps the full quotient
        assert_eq!(resolve_amount(dec!(33333), &l), dec!(4166.625));
    }
}
