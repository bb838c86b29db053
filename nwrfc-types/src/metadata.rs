//! Function module metadata and parameter conformance checks.
//!
//! The native SDK fills function containers field by field and rejects values
//! whose shape does not fit the field's RFC type. [`FunctionDesc::check`]
//! applies the same rules up front:
//!
//! | RFC type                        | accepted values                   |
//! |---------------------------------|-----------------------------------|
//! | CHAR, STRING, NUM, DATE, TIME   | text                              |
//! | BYTE, XSTRING                   | binary                            |
//! | BCD, FLOAT                      | integer, float or text            |
//! | INT, INT1, INT2, INT8           | integer, or float without fraction|
//! | STRUCTURE                       | structure                         |
//! | TABLE                           | table, or array of rows           |

use crate::error::TypeError;
use crate::value::{RfcStructure, RfcValue};

/// RFC data types with their SDK codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RfcType {
    Char,
    Date,
    Bcd,
    Time,
    Byte,
    Table,
    Num,
    Float,
    Int,
    Int2,
    Int1,
    Structure,
    String,
    XString,
    Int8,
}

impl RfcType {
    /// Numeric `RFCTYPE` code.
    pub fn code(&self) -> u32 {
        match self {
            RfcType::Char => 0,
            RfcType::Date => 1,
            RfcType::Bcd => 2,
            RfcType::Time => 3,
            RfcType::Byte => 4,
            RfcType::Table => 5,
            RfcType::Num => 6,
            RfcType::Float => 7,
            RfcType::Int => 8,
            RfcType::Int2 => 9,
            RfcType::Int1 => 10,
            RfcType::Structure => 17,
            RfcType::String => 29,
            RfcType::XString => 30,
            RfcType::Int8 => 31,
        }
    }

    pub fn is_integer(&self) -> bool {
        matches!(
            self,
            RfcType::Int | RfcType::Int1 | RfcType::Int2 | RfcType::Int8
        )
    }

    pub fn is_container(&self) -> bool {
        matches!(self, RfcType::Structure | RfcType::Table)
    }
}

impl TryFrom<u32> for RfcType {
    type Error = TypeError;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        Ok(match code {
            0 => RfcType::Char,
            1 => RfcType::Date,
            2 => RfcType::Bcd,
            3 => RfcType::Time,
            4 => RfcType::Byte,
            5 => RfcType::Table,
            6 => RfcType::Num,
            7 => RfcType::Float,
            8 => RfcType::Int,
            9 => RfcType::Int2,
            10 => RfcType::Int1,
            17 => RfcType::Structure,
            29 => RfcType::String,
            30 => RfcType::XString,
            31 => RfcType::Int8,
            other => return Err(TypeError::UnknownType(other)),
        })
    }
}

/// Parameter direction as seen from the called function module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Import,
    Export,
    Changing,
    Tables,
}

impl Direction {
    /// Whether the caller may supply this parameter.
    pub fn is_input(&self) -> bool {
        !matches!(self, Direction::Export)
    }
}

/// A field of a structure or table line type.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDesc {
    pub name: String,
    pub rfc_type: RfcType,
    /// Length in non-Unicode bytes.
    pub nuc_length: u32,
    /// Line type, for STRUCTURE and TABLE fields.
    pub type_desc: Option<TypeDesc>,
}

impl FieldDesc {
    pub fn new(name: impl Into<String>, rfc_type: RfcType, nuc_length: u32) -> Self {
        Self {
            name: name.into(),
            rfc_type,
            nuc_length,
            type_desc: None,
        }
    }

    pub fn with_type(mut self, type_desc: TypeDesc) -> Self {
        self.type_desc = Some(type_desc);
        self
    }
}

/// Named structure type.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDesc {
    pub name: String,
    pub fields: Vec<FieldDesc>,
}

impl TypeDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    pub fn with_field(mut self, field: FieldDesc) -> Self {
        self.fields.push(field);
        self
    }

    pub fn field(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Line types with a single unnamed field hold scalar table rows.
    pub fn is_unnamed_line(&self) -> bool {
        self.fields.len() == 1 && self.fields[0].name.is_empty()
    }

    /// Checks every field of `value` against this type.
    pub fn check(&self, value: &RfcStructure) -> Result<(), TypeError> {
        for (name, field_value) in value {
            let field = self.field(name).ok_or_else(|| TypeError::UnknownField {
                type_name: self.name.clone(),
                field: name.clone(),
            })?;
            check_value(
                field.rfc_type,
                &field.name,
                field.type_desc.as_ref(),
                field_value,
            )?;
        }
        Ok(())
    }
}

/// A function module parameter.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterDesc {
    pub name: String,
    pub direction: Direction,
    pub rfc_type: RfcType,
    pub nuc_length: u32,
    pub type_desc: Option<TypeDesc>,
    pub optional: bool,
}

impl ParameterDesc {
    pub fn new(
        name: impl Into<String>,
        direction: Direction,
        rfc_type: RfcType,
        nuc_length: u32,
    ) -> Self {
        Self {
            name: name.into(),
            direction,
            rfc_type,
            nuc_length,
            type_desc: None,
            optional: false,
        }
    }

    pub fn with_type(mut self, type_desc: TypeDesc) -> Self {
        self.type_desc = Some(type_desc);
        self
    }

    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }
}

/// Interface of a remote-enabled function module.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDesc {
    pub name: String,
    pub parameters: Vec<ParameterDesc>,
}

impl FunctionDesc {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: Vec::new(),
        }
    }

    pub fn with_parameter(mut self, parameter: ParameterDesc) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterDesc> {
        self.parameters.iter().find(|p| p.name == name)
    }

    /// Checks call parameters against the function interface.
    ///
    /// Stops at the first offending parameter.
    pub fn check(&self, params: &RfcStructure) -> Result<(), TypeError> {
        for (name, value) in params {
            let param = self
                .parameter(name)
                .ok_or_else(|| TypeError::UnknownParameter {
                    function: self.name.clone(),
                    parameter: name.clone(),
                })?;
            check_value(param.rfc_type, &param.name, param.type_desc.as_ref(), value)?;
        }
        Ok(())
    }
}

/// Checks a single value against an RFC type.
pub fn check_value(
    rfc_type: RfcType,
    name: &str,
    type_desc: Option<&TypeDesc>,
    value: &RfcValue,
) -> Result<(), TypeError> {
    let mismatch = |expected: &'static str| TypeError::Mismatch {
        field: name.to_string(),
        rfc_type: rfc_type.code(),
        expected,
        actual: value.kind(),
    };

    match rfc_type {
        RfcType::Structure => {
            let s = value.as_structure().ok_or_else(|| mismatch("Structure"))?;
            line_type(name, type_desc)?.check(s)
        }
        RfcType::Table => {
            let line = line_type(name, type_desc)?;
            match value {
                RfcValue::Table(rows) => rows.iter().try_for_each(|row| line.check(row)),
                RfcValue::Array(rows) => rows.iter().try_for_each(|row| match row {
                    RfcValue::Structure(s) => line.check(s),
                    scalar if scalar.is_scalar() => {
                        let mut wrapped = RfcStructure::new();
                        wrapped.insert(String::new(), scalar.clone());
                        line.check(&wrapped)
                    }
                    _ => Err(mismatch("Table row")),
                }),
                _ => Err(mismatch("Table")),
            }
        }
        RfcType::Char | RfcType::String | RfcType::Num | RfcType::Time => match value {
            RfcValue::Text(_) => Ok(()),
            _ => Err(mismatch("Char")),
        },
        RfcType::Date => match value {
            RfcValue::Text(_) => Ok(()),
            _ => Err(mismatch("Date string YYYYMMDD")),
        },
        RfcType::Byte | RfcType::XString => match value {
            RfcValue::Binary(_) => Ok(()),
            _ => Err(mismatch("Buffer")),
        },
        RfcType::Bcd | RfcType::Float => match value {
            RfcValue::Int(_) | RfcValue::Float(_) | RfcValue::Text(_) => Ok(()),
            _ => Err(mismatch("Number, number object or string")),
        },
        RfcType::Int | RfcType::Int1 | RfcType::Int2 | RfcType::Int8 => match value {
            RfcValue::Int(_) => Ok(()),
            RfcValue::Float(f) if f.fract() == 0.0 && f.is_finite() => Ok(()),
            RfcValue::Float(f) => Err(TypeError::NotIntegral {
                field: name.to_string(),
                rfc_type: rfc_type.code(),
                value: *f,
            }),
            _ => Err(mismatch("Integer number")),
        },
    }
}

fn line_type<'a>(name: &str, type_desc: Option<&'a TypeDesc>) -> Result<&'a TypeDesc, TypeError> {
    type_desc.ok_or_else(|| TypeError::MissingTypeDescription(name.to_string()))
}

/// Strips trailing whitespace from a fixed-length CHAR value.
pub fn rstrip(value: &str) -> &str {
    value.trim_end()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rfcstruct() -> TypeDesc {
        TypeDesc::new("RFCTEST")
            .with_field(FieldDesc::new("RFCCHAR4", RfcType::Char, 4))
            .with_field(FieldDesc::new("RFCINT4", RfcType::Int, 4))
            .with_field(FieldDesc::new("RFCFLOAT", RfcType::Float, 8))
            .with_field(FieldDesc::new("RFCDATE", RfcType::Date, 8))
            .with_field(FieldDesc::new("RFCHEX3", RfcType::Byte, 3))
    }

    fn stfc_structure() -> FunctionDesc {
        FunctionDesc::new("STFC_STRUCTURE")
            .with_parameter(
                ParameterDesc::new("IMPORTSTRUCT", Direction::Import, RfcType::Structure, 144)
                    .with_type(rfcstruct()),
            )
            .with_parameter(
                ParameterDesc::new("RFCTABLE", Direction::Tables, RfcType::Table, 144)
                    .with_type(rfcstruct())
                    .optional(),
            )
            .with_parameter(
                ParameterDesc::new("ECHOSTRUCT", Direction::Export, RfcType::Structure, 144)
                    .with_type(rfcstruct()),
            )
    }

    fn params(pairs: Vec<(&str, RfcValue)>) -> RfcStructure {
        pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
    }

    #[test]
    fn test_type_codes_roundtrip() {
        for code in [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 17, 29, 30, 31] {
            assert_eq!(RfcType::try_from(code).unwrap().code(), code);
        }
        assert_eq!(RfcType::try_from(99), Err(TypeError::UnknownType(99)));
    }

    #[test]
    fn test_check_valid_structure() {
        let import: RfcValue = [
            ("RFCCHAR4", RfcValue::from("ABCD")),
            ("RFCINT4", RfcValue::from(42i64)),
            ("RFCFLOAT", RfcValue::from("1.5")),
            ("RFCDATE", RfcValue::from("20240101")),
            ("RFCHEX3", RfcValue::from(vec![1u8, 2, 3])),
        ]
        .into_iter()
        .collect();
        let p = params(vec![("IMPORTSTRUCT", import)]);
        assert!(stfc_structure().check(&p).is_ok());
    }

    #[test]
    fn test_check_unknown_parameter() {
        let p = params(vec![("NOPE", RfcValue::from("x"))]);
        let err = stfc_structure().check(&p).unwrap_err();
        assert!(matches!(err, TypeError::UnknownParameter { ref parameter, .. } if parameter == "NOPE"));
    }

    #[test]
    fn test_check_unknown_field() {
        let import: RfcValue = [("NOPE", "x")].into_iter().collect();
        let p = params(vec![("IMPORTSTRUCT", import)]);
        let err = stfc_structure().check(&p).unwrap_err();
        assert!(err.to_string().contains("RFCTEST"));
    }

    #[test]
    fn test_check_char_requires_text() {
        let import: RfcValue = [("RFCCHAR4", RfcValue::from(1i64))].into_iter().collect();
        let p = params(vec![("IMPORTSTRUCT", import)]);
        let err = stfc_structure().check(&p).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Char expected when filling field 'RFCCHAR4' of type 0, got integer"
        );
    }

    #[test]
    fn test_check_byte_requires_binary() {
        let import: RfcValue = [("RFCHEX3", "010203")].into_iter().collect();
        let p = params(vec![("IMPORTSTRUCT", import)]);
        let err = stfc_structure().check(&p).unwrap_err();
        assert!(err.to_string().starts_with("Buffer expected"));
    }

    #[test]
    fn test_check_structure_requires_structure() {
        let p = params(vec![("IMPORTSTRUCT", RfcValue::from("x"))]);
        let err = stfc_structure().check(&p).unwrap_err();
        assert!(err.to_string().starts_with("Structure expected"));
    }

    #[test]
    fn test_check_table_rows() {
        let row: RfcStructure = [("RFCINT4".to_string(), RfcValue::from(1i64))]
            .into_iter()
            .collect();
        let bad: RfcStructure = [("RFCINT4".to_string(), RfcValue::from(1.25))]
            .into_iter()
            .collect();

        let ok = params(vec![("RFCTABLE", RfcValue::Table(vec![row.clone()]))]);
        assert!(stfc_structure().check(&ok).is_ok());

        let err = params(vec![("RFCTABLE", RfcValue::Table(vec![row, bad]))]);
        assert!(matches!(
            stfc_structure().check(&err),
            Err(TypeError::NotIntegral { .. })
        ));

        let scalar = params(vec![("RFCTABLE", RfcValue::from(1i64))]);
        assert!(stfc_structure().check(&scalar).is_err());
    }

    #[test]
    fn test_check_scalar_rows_need_unnamed_line() {
        let line = TypeDesc::new("TAB512").with_field(FieldDesc::new("", RfcType::Char, 512));
        assert!(line.is_unnamed_line());

        let rows = RfcValue::Array(vec![RfcValue::from("a"), RfcValue::from("b")]);
        assert!(check_value(RfcType::Table, "DATA", Some(&line), &rows).is_ok());

        let err = check_value(RfcType::Table, "RFCTABLE", Some(&rfcstruct()), &rows);
        assert!(matches!(err, Err(TypeError::UnknownField { .. })));
    }

    #[test]
    fn test_check_missing_type_description() {
        let value = RfcValue::Structure(RfcStructure::new());
        assert_eq!(
            check_value(RfcType::Structure, "S", None, &value),
            Err(TypeError::MissingTypeDescription("S".to_string()))
        );
    }

    #[test]
    fn test_rstrip() {
        assert_eq!(rstrip("ABC   "), "ABC");
        assert_eq!(rstrip("   "), "");
        assert_eq!(rstrip(" A B "), " A B");
    }

    #[test]
    fn test_direction_input() {
        assert!(Direction::Import.is_input());
        assert!(Direction::Changing.is_input());
        assert!(Direction::Tables.is_input());
        assert!(!Direction::Export.is_input());
    }

    proptest! {
        #[test]
        fn prop_integers_fill_int_fields(n in any::<i64>()) {
            prop_assert!(check_value(RfcType::Int8, "N", None, &RfcValue::Int(n)).is_ok());
            prop_assert!(check_value(RfcType::Float, "F", None, &RfcValue::Int(n)).is_ok());
        }

        #[test]
        fn prop_fractional_floats_rejected_for_int(whole in -1_000_000i64..1_000_000, frac in 0.01f64..0.99) {
            let value = RfcValue::Float(whole as f64 + frac);
            let is_not_integral = matches!(
                check_value(RfcType::Int, "N", None, &value),
                Err(TypeError::NotIntegral { .. })
            );
            prop_assert!(is_not_integral);
        }

        #[test]
        fn prop_text_never_fills_int(s in ".*") {
            prop_assert!(check_value(RfcType::Int, "N", None, &RfcValue::Text(s)).is_err());
        }
    }
}
