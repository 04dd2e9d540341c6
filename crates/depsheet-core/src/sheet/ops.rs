use super::Spreadsheet;
use super::state::{Cell, parse_name};
use crate::error::{Result, SheetError};
use depsheet_engine::engine::{CellName, CellValue, Contents, recalculation_order};
use tracing::{debug, trace, warn};

impl Spreadsheet {
    /// Set a cell from user input and recompute everything that depends on it.
    ///
    /// Input starting with `=` is a formula, input that parses as a number is a
    /// number, anything else is text. Setting `""` empties the cell.
    ///
    /// Returns the changed cell followed by every cell that (transitively)
    /// depends on it, each after the cells it reads. On error nothing changes.
    pub fn set_content(&mut self, name: &str, input: &str) -> Result<Vec<CellName>> {
        let name = parse_name(name)?;
        let contents = Contents::from_input(input)?;
        self.set_cell_contents(name, contents)
    }

    /// Set already-classified contents; see [`Spreadsheet::set_content`].
    ///
    /// Contents must be something `set_content` could produce, so the cell
    /// saves and reloads unchanged: no text that reads as a number or starts
    /// with `=`, and no non-finite numbers.
    pub fn set_contents(&mut self, name: &str, contents: Contents) -> Result<Vec<CellName>> {
        let name = parse_name(name)?;
        let input = contents.to_input_string();
        if Contents::from_input(&input).ok().as_ref() != Some(&contents) {
            return Err(SheetError::InvalidContents(input));
        }
        self.set_cell_contents(name, contents)
    }

    /// Empty a cell. Cells that read it are recomputed.
    pub fn clear(&mut self, name: &str) -> Result<Vec<CellName>> {
        self.set_contents(name, Contents::empty())
    }

    fn set_cell_contents(&mut self, name: CellName, contents: Contents) -> Result<Vec<CellName>> {
        let old_dependees: Vec<CellName> = self.graph.dependees(&name).cloned().collect();
        self.graph.replace_dependees(&name, contents.dependees());

        let order = match recalculation_order(&self.graph, &name) {
            Ok(order) => order,
            Err(err) => {
                warn!(cell = %name, "rejecting change: circular dependency");
                self.graph.replace_dependees(&name, old_dependees);
                return Err(err.into());
            }
        };

        let old_contents = self.cells.get(&name).map(|cell| &cell.contents);
        let differs = match old_contents {
            Some(old) => *old != contents,
            None => !contents.is_empty(),
        };
        self.changed |= differs;

        if contents.is_empty() {
            self.cells.remove(&name);
        } else {
            // Nothing this cell reads is in `order`, so its inputs are current.
            let value = self.compute_value(&contents);
            self.cells.insert(name.clone(), Cell { contents, value });
        }

        debug!(cell = %name, affected = order.len(), "cell contents set");
        self.recompute(order.iter().skip(1));
        Ok(order)
    }

    /// Recompute cached values, in order. Absent cells are skipped.
    fn recompute<'a>(&mut self, order: impl Iterator<Item = &'a CellName>) {
        for name in order {
            let Some(cell) = self.cells.get(name) else {
                continue;
            };
            let value = self.compute_value(&cell.contents);
            trace!(cell = %name, value = %value, "recomputed");
            if let Some(cell) = self.cells.get_mut(name) {
                cell.value = value;
            }
        }
    }

    /// Value of `contents` given the current cached values of other cells.
    pub(crate) fn compute_value(&self, contents: &Contents) -> CellValue {
        match contents {
            Contents::Number(n) => CellValue::Number(*n),
            Contents::Text(s) => CellValue::Text(s.clone()),
            Contents::Formula(formula) => match formula.evaluate(|var| self.lookup(var)) {
                Ok(n) => CellValue::Number(n),
                Err(e) => CellValue::Error(e),
            },
        }
    }

    /// Numeric value of a referenced cell, for formula evaluation.
    fn lookup(&self, name: &CellName) -> std::result::Result<f64, String> {
        match self.cells.get(name).map(|cell| &cell.value) {
            Some(CellValue::Number(n)) => Ok(*n),
            Some(CellValue::Text(_)) => Err("cell holds text, not a number".to_string()),
            Some(CellValue::Error(_)) => Err("cell has an error".to_string()),
            None => Err("cell is empty".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Spreadsheet;
    use crate::error::SheetError;
    use depsheet_engine::engine::{CellName, CellValue, Contents, FormulaError};

    fn names(list: &[CellName]) -> Vec<&str> {
        list.iter().map(|n| n.as_str()).collect()
    }

    #[test]
    fn test_number_text_and_formula() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "5").unwrap();
        sheet.set_content("A2", "hello").unwrap();
        sheet.set_content("A3", "=A1*2").unwrap();
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(5.0));
        assert_eq!(sheet.value("A2").unwrap(), CellValue::Text("hello".to_string()));
        assert_eq!(sheet.value("A3").unwrap(), CellValue::Number(10.0));
        assert_eq!(sheet.contents("A1").unwrap(), Contents::Number(5.0));
    }

    #[test]
    fn test_names_are_case_insensitive() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("a1", "5").unwrap();
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(5.0));
        assert_eq!(names(&sheet.set_content("b1", "=a1").unwrap()), vec!["B1"]);
    }

    #[test]
    fn test_recalculation_order_and_values() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "5").unwrap();
        sheet.set_content("B1", "=A1+2").unwrap();
        sheet.set_content("C1", "=A1+B1").unwrap();
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(12.0));

        let order = sheet.set_content("A1", "10").unwrap();
        assert_eq!(names(&order), vec!["A1", "B1", "C1"]);
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(12.0));
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(22.0));
    }

    #[test]
    fn test_self_reference_is_rejected_and_rolled_back() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("C1", "7").unwrap();
        let err = sheet.set_content("C1", "=C1+1").unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency(ref n) if n.as_str() == "C1"));
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(7.0));
        assert_eq!(sheet.contents("C1").unwrap(), Contents::Number(7.0));
        assert!(sheet.graph.is_empty());
    }

    #[test]
    fn test_indirect_cycle_restores_previous_formula() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "=B1+1").unwrap();
        sheet.set_content("B1", "=C1+1").unwrap();
        sheet.set_content("C1", "3").unwrap();
        let before_edges = sheet.graph.size();

        let err = sheet.set_content("C1", "=A1").unwrap_err();
        assert!(matches!(err, SheetError::CircularDependency(_)));
        assert_eq!(sheet.contents("C1").unwrap(), Contents::Number(3.0));
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Number(5.0));
        assert_eq!(sheet.graph.size(), before_edges);
        assert!(sheet.direct_dependents("A1").unwrap().is_empty());
    }

    #[test]
    fn test_cycle_on_new_cell_leaves_it_absent() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "=B1").unwrap();
        assert!(sheet.set_content("B1", "=A1").is_err());
        assert_eq!(sheet.contents("B1").unwrap(), Contents::empty());
        assert!(!sheet.non_empty_names().iter().any(|n| n.as_str() == "B1"));
    }

    #[test]
    fn test_invalid_name_has_no_side_effects() {
        let mut sheet = Spreadsheet::new();
        let err = sheet.set_content("1A", "5").unwrap_err();
        assert_eq!(err, SheetError::InvalidName("1A".to_string()));
        assert!(sheet.is_empty());
        assert!(!sheet.changed());
        assert!(sheet.value("A").is_err());
        assert!(sheet.contents("").is_err());
    }

    #[test]
    fn test_bad_formula_is_rejected() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "=B1").unwrap();
        let err = sheet.set_content("A1", "=B1+").unwrap_err();
        assert!(matches!(err, SheetError::FormulaFormat(_)));
        assert_eq!(sheet.string_form("A1").unwrap(), "=B1");
        assert!(matches!(sheet.set_content("A2", "="), Err(SheetError::FormulaFormat(_))));
        assert!(sheet.contents("A2").unwrap().is_empty());
    }

    #[test]
    fn test_evaluation_errors_are_values() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "5").unwrap();
        sheet.set_content("B1", "=A1/0").unwrap();
        sheet.set_content("C1", "=Z9+1").unwrap();
        assert_eq!(
            sheet.value("B1").unwrap(),
            CellValue::Error(FormulaError::DivisionByZero)
        );
        assert!(sheet.value("C1").unwrap().is_error());
        assert!(sheet.non_empty_names().len() == 3);
    }

    #[test]
    fn test_errors_flow_to_dependents() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "0").unwrap();
        sheet.set_content("B1", "=1/A1").unwrap();
        sheet.set_content("C1", "=B1+1").unwrap();
        assert!(sheet.value("C1").unwrap().is_error());

        sheet.set_content("A1", "4").unwrap();
        assert_eq!(sheet.value("C1").unwrap(), CellValue::Number(1.25));
    }

    #[test]
    fn test_text_reference_is_an_error() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "abc").unwrap();
        sheet.set_content("B1", "=A1").unwrap();
        assert!(sheet.value("B1").unwrap().is_error());
    }

    #[test]
    fn test_emptying_a_cell_updates_dependents() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "5").unwrap();
        sheet.set_content("B1", "=A1+1").unwrap();

        let order = sheet.set_content("A1", "").unwrap();
        assert_eq!(names(&order), vec!["A1", "B1"]);
        assert!(!sheet.non_empty_names().iter().any(|n| n.as_str() == "A1"));
        assert_eq!(sheet.value("A1").unwrap(), CellValue::Text(String::new()));
        assert_eq!(sheet.string_form("B1").unwrap(), "=A1+1");
        assert!(sheet.value("B1").unwrap().is_error());

        sheet.set_content("A1", "1").unwrap();
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(2.0));
    }

    #[test]
    fn test_reference_to_future_cell_resolves_later() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("B1", "=A1*3").unwrap();
        assert!(sheet.value("B1").unwrap().is_error());
        let order = sheet.set_content("A1", "2").unwrap();
        assert_eq!(names(&order), vec!["A1", "B1"]);
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(6.0));
    }

    #[test]
    fn test_replacing_formula_drops_old_edges() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("C1", "=A1+B1").unwrap();
        assert_eq!(names(&sheet.direct_dependents("A1").unwrap()), vec!["C1"]);
        sheet.set_content("C1", "=B1").unwrap();
        assert!(sheet.direct_dependents("A1").unwrap().is_empty());
        assert_eq!(names(&sheet.direct_dependents("b1").unwrap()), vec!["C1"]);
        sheet.set_content("C1", "9").unwrap();
        assert!(sheet.direct_dependents("B1").unwrap().is_empty());
    }

    #[test]
    fn test_changed_flag() {
        let mut sheet = Spreadsheet::new();
        assert!(!sheet.changed());
        sheet.set_content("A1", "").unwrap();
        assert!(!sheet.changed());
        let _ = sheet.set_content("A1", "=A1");
        assert!(!sheet.changed());
        sheet.set_content("A1", "1").unwrap();
        assert!(sheet.changed());
    }

    #[test]
    fn test_set_contents_and_clear() {
        let mut sheet = Spreadsheet::new();
        sheet.set_contents("A1", Contents::Number(3.0)).unwrap();
        sheet.set_content("B1", "=A1").unwrap();
        assert_eq!(sheet.value("B1").unwrap(), CellValue::Number(3.0));
        sheet.clear("A1").unwrap();
        assert!(sheet.value("B1").unwrap().is_error());
        assert_eq!(sheet.len(), 1);
    }

    #[test]
    fn test_set_contents_rejects_contents_input_cannot_express() {
        let mut sheet = Spreadsheet::new();
        sheet.set_content("A1", "1").unwrap();
        for contents in [
            Contents::Text("=1+".to_string()),
            Contents::Text("5".to_string()),
            Contents::Text(" 2.5 ".to_string()),
            Contents::Number(f64::NAN),
            Contents::Number(f64::INFINITY),
        ] {
            let err = sheet.set_contents("A1", contents.clone()).unwrap_err();
            assert!(matches!(err, SheetError::InvalidContents(_)), "{:?}", contents);
        }
        assert_eq!(sheet.contents("A1").unwrap(), Contents::Number(1.0));

        sheet.set_contents("A2", Contents::Text("five".to_string())).unwrap();
        sheet.set_contents("A3", Contents::Number(-0.5)).unwrap();
        let reloaded = Spreadsheet::from_json_str(&sheet.to_json_string(false).unwrap()).unwrap();
        for name in ["A1", "A2", "A3"] {
            assert_eq!(reloaded.contents(name).unwrap(), sheet.contents(name).unwrap());
        }
    }

    #[test]
    fn test_error_reason_does_not_grow_along_a_chain() {
        let mut sheet = Spreadsheet::new();
        for i in 2..=1000 {
            sheet.set_content(&format!("A{}", i), &format!("=A{}+1", i - 1)).unwrap();
        }
        for name in ["A2", "A10", "A100", "A1000"] {
            match sheet.value(name).unwrap() {
                CellValue::Error(e) => assert!(e.reason().len() < 64, "{}: {}", name, e),
                other => panic!("{} should be an error, got {:?}", name, other),
            }
        }
    }
}
