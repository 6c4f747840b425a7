use std::fmt::Display;

use serde::Serialize;

/// External forecast variable a sales category maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VariableId {
    /// Cold food (café and salad categories).
    Kallmat,
    /// Hot food (kitchen categories).
    Varmmat,
}

impl VariableId {
    pub fn as_str(&self) -> &'static str {
        match self {
            VariableId::Kallmat => "kallmat",
            VariableId::Varmmat => "varmmat",
        }
    }
}

impl Display for VariableId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Classification rules in priority order, matched against the
/// lowercased label. First match wins.
const RULES: &[(fn(&str) -> bool, VariableId)] = &[
    (
        |label| label.contains("café") || label.contains("sallad"),
        VariableId::Kallmat,
    ),
    (
        |label| label.contains("food") && (label.contains("kitchen") || label.contains("printer")),
        VariableId::Varmmat,
    ),
    (|label| label.contains("food"), VariableId::Varmmat),
];

/// Maps a free-text category label to a forecast variable.
///
/// Returns `None` for unrecognized categories, which the caller
/// discards silently.
pub fn classify(category: &str) -> Option<VariableId> {
    let label = category.to_lowercase();
    RULES
        .iter()
        .find(|(matches, _)| matches(&label))
        .map(|(_, variable_id)| *variable_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        let cases = vec![
            ("Café Kallt", Some(VariableId::Kallmat)),
            ("SALLAD BAR", Some(VariableId::Kallmat)),
            ("Food Kitchen Printer", Some(VariableId::Varmmat)),
            ("Food kitchen", Some(VariableId::Varmmat)),
            ("FOOD PRINTER", Some(VariableId::Varmmat)),
            ("Food", Some(VariableId::Varmmat)),
            ("Drinks", None),
            ("", None),
            ("Kitchen", None),
            // Café takes precedence over food.
            ("Café Food", Some(VariableId::Kallmat)),
            ("CAFÉ", Some(VariableId::Kallmat)),
        ];

        for (label, expected) in cases {
            assert_eq!(classify(label), expected, "{label:?}");
        }
    }

    #[test]
    fn test_variable_id_strings() {
        assert_eq!(VariableId::Kallmat.to_string(), "kallmat");
        assert_eq!(VariableId::Varmmat.to_string(), "varmmat");
    }

    #[test]
    fn test_variable_id_order() {
        // Lexicographic tie break in the output sort relies on this.
        assert!(VariableId::Kallmat < VariableId::Varmmat);
    }
}
