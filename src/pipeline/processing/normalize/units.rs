use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::config::{FieldUnits, Scale, SourceColumn};

/// A number with an optional unit annotation, either parenthesized
/// (`1.0 (Jupiter masses)`) or trailing (`12 pc`).
static NUMBER_WITH_UNIT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*([+-]?(?:\d+(?:\.\d*)?|\.\d+)(?:[eE][+-]?\d+)?)\s*(?:\(\s*([^()]*?)\s*\)|([A-Za-z][A-Za-z _\-]*?))?\s*$",
    )
    .expect("number pattern is valid")
});

/// Outcome of reading one raw cell for a numeric field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldParse {
    /// Converted into the canonical unit
    Value(f64),
    /// Absent, null or a sentinel token
    Missing,
    /// Not a number the parser understands
    Malformed(String),
    /// Number with a unit that has no factor in the table
    UnknownUnit(String),
}

/// Raw cell rendered for the demotion log.
pub fn render_raw(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Split text into its number and optional unit annotation.
pub fn split_number_and_unit(text: &str) -> Option<(f64, Option<String>)> {
    let caps = NUMBER_WITH_UNIT.captures(text)?;
    let number = caps.get(1)?.as_str().parse::<f64>().ok()?;
    let unit = caps
        .get(2)
        .or_else(|| caps.get(3))
        .map(|m| m.as_str().trim().to_string())
        .filter(|u| !u.is_empty());
    Some((number, unit))
}

/// Read `value` as found in `column` and convert it into the field's
/// canonical unit.
pub fn parse_cell(
    value: &Value,
    column: &SourceColumn,
    units: &FieldUnits,
    is_missing: impl Fn(&str) -> bool,
) -> FieldParse {
    let (number, annotation) = match value {
        Value::Null => return FieldParse::Missing,
        Value::Number(n) => match n.as_f64() {
            Some(v) => (v, None),
            None => return FieldParse::Malformed(n.to_string()),
        },
        Value::String(s) => {
            if is_missing(s) {
                return FieldParse::Missing;
            }
            match split_number_and_unit(s) {
                Some(parsed) => parsed,
                None => return FieldParse::Malformed(s.clone()),
            }
        }
        other => return FieldParse::Malformed(render_raw(other)),
    };

    let unit = annotation.as_deref().unwrap_or(&column.unit);
    let factor = match units.factor(unit) {
        Some(f) => f,
        None => return FieldParse::UnknownUnit(unit.to_string()),
    };

    let scaled = match column.scale {
        Scale::Linear => number,
        Scale::Log10 => 10f64.powf(number),
        Scale::ParallaxMas => {
            if number <= 0.0 {
                return FieldParse::Malformed(render_raw(value));
            }
            1000.0 / number
        }
    };

    let converted = scaled * factor;
    if converted.is_finite() {
        FieldParse::Value(converted)
    } else {
        FieldParse::Malformed(render_raw(value))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::UnitsConfig;
    use crate::constants::{JUPITER_MASS_IN_EARTH, PARSEC_IN_LIGHT_YEARS};
    use serde_json::json;

    fn missing(units: &UnitsConfig) -> impl Fn(&str) -> bool + '_ {
        move |s| units.is_missing_token(s)
    }

    #[test]
    fn test_splits_parenthesized_and_trailing_units() {
        assert_eq!(
            split_number_and_unit("1.0 (Jupiter masses)"),
            Some((1.0, Some("Jupiter masses".to_string())))
        );
        assert_eq!(split_number_and_unit("12 pc"), Some((12.0, Some("pc".to_string()))));
        assert_eq!(split_number_and_unit(" 3.5e2 "), Some((350.0, None)));
        assert_eq!(split_number_and_unit("about 5"), None);
        assert_eq!(split_number_and_unit("5 (unclosed"), None);
    }

    #[test]
    fn test_jupiter_annotation_converts_exactly() {
        let units = UnitsConfig::default();
        let column = &units.mass.columns[0];
        let parsed = parse_cell(
            &json!("1.0 (Jupiter masses)"),
            column,
            &units.mass,
            missing(&units),
        );
        assert_eq!(parsed, FieldParse::Value(1.0 * JUPITER_MASS_IN_EARTH));
    }

    #[test]
    fn test_column_unit_applies_without_annotation() {
        let units = UnitsConfig::default();
        let pc_column = &units.distance.columns[0];
        assert_eq!(
            parse_cell(&json!(10.0), pc_column, &units.distance, missing(&units)),
            FieldParse::Value(10.0 * PARSEC_IN_LIGHT_YEARS)
        );
    }

    #[test]
    fn test_sentinels_and_garbage() {
        let units = UnitsConfig::default();
        let column = &units.radius.columns[0];
        for token in ["", "  ", "N/A", "unknown", "NaN", "--"] {
            assert_eq!(
                parse_cell(&json!(token), column, &units.radius, missing(&units)),
                FieldParse::Missing,
                "token {:?}",
                token
            );
        }
        assert!(matches!(
            parse_cell(&json!("big"), column, &units.radius, missing(&units)),
            FieldParse::Malformed(_)
        ));
        assert!(matches!(
            parse_cell(&json!(true), column, &units.radius, missing(&units)),
            FieldParse::Malformed(_)
        ));
        assert_eq!(
            parse_cell(&json!("2 furlongs"), column, &units.radius, missing(&units)),
            FieldParse::UnknownUnit("furlongs".to_string())
        );
    }

    #[test]
    fn test_parallax_and_log_scales() {
        let units = UnitsConfig::default();
        let plx = units
            .distance
            .columns
            .iter()
            .find(|c| c.scale == Scale::ParallaxMas)
            .unwrap();
        assert_eq!(
            parse_cell(&json!(100.0), plx, &units.distance, missing(&units)),
            FieldParse::Value(10.0 * PARSEC_IN_LIGHT_YEARS)
        );
        assert!(matches!(
            parse_cell(&json!(0.0), plx, &units.distance, missing(&units)),
            FieldParse::Malformed(_)
        ));

        let lum = &units.star_luminosity.columns[0];
        match parse_cell(&json!(0.0), lum, &units.star_luminosity, missing(&units)) {
            FieldParse::Value(v) => assert!((v - 1.0).abs() < 1e-12),
            other => panic!("unexpected {:?}", other),
        }
    }
}
