//! Append-only log of successful calculations.

const EMPTY_HISTORY: &str = "No calculations recorded.";

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct History {
    entries: Vec<String>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `"<operands> <operation> = <result>"`.
    pub fn record(&mut self, operation: &str, operands: &[f64], result: f64) {
        let operands = operands
            .iter()
            .map(|value| format_number(*value))
            .collect::<Vec<_>>()
            .join(" ");
        self.append(format!("{operands} {operation} = {}", format_number(result)));
    }

    pub fn append(&mut self, entry: String) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    pub fn render(&self) -> String {
        if self.entries.is_empty() {
            return EMPTY_HISTORY.to_string();
        }
        self.entries.join("\n")
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Whole numbers print without a fractional part; `-0` prints as `0`.
pub fn format_number(value: f64) -> String {
    if value == 0.0 {
        return "0".to_string();
    }
    // f64's Display is already the shortest round-trip form and never adds a
    // trailing ".0".
    value.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_render_in_order() {
        let mut history = History::new();
        assert_eq!(history.render(), "No calculations recorded.");

        history.record("add", &[3.0, 2.0], 5.0);
        history.record("divide", &[1.0, 4.0], 0.25);
        assert_eq!(history.len(), 2);
        assert_eq!(history.render(), "3 2 add = 5\n1 4 divide = 0.25");

        history.clear();
        assert!(history.is_empty());
        assert_eq!(history.render(), "No calculations recorded.");
    }

    #[test]
    fn numbers_drop_fractional_suffix_only_when_whole() {
        assert_eq!(format_number(8.0), "8");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(2.5), "2.5");
        assert_eq!(format_number(2e6), "2000000");
        assert_eq!(format_number(f64::INFINITY), "inf");
    }
}
