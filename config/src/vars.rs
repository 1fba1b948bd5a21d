//! `${VAR}` expansion and conversion of configured TOML values into
//! argument values.

use std::env;

use serde_json::{Map, Number, Value};

/// Replace every `${NAME}` with the value of environment variable `NAME`.
///
/// Unset variables expand to the empty string. An unterminated `${` is
/// kept verbatim.
pub fn expand_env_vars(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;

    while let Some(start) = rest.find("${") {
        let after = &rest[start + 2..];
        let Some(end) = after.find('}') else {
            break;
        };
        out.push_str(&rest[..start]);
        let var = &after[..end];
        if !var.is_empty() {
            out.push_str(&env::var(var).unwrap_or_default());
        }
        rest = &after[end + 1..];
    }

    out.push_str(rest);
    out
}

/// Convert a configured TOML value into an argument value.
///
/// Strings go through [`expand_env_vars`] and datetimes become their TOML
/// text. Non-finite floats are rejected; the error names the element that
/// holds one, e.g. `limits.ratios[1]`.
pub fn toml_to_argument(value: &toml::Value) -> Result<Value, String> {
    convert(value, "")
}

fn convert(value: &toml::Value, path: &str) -> Result<Value, String> {
    match value {
        toml::Value::String(s) => Ok(Value::String(expand_env_vars(s))),
        toml::Value::Integer(i) => Ok(Value::from(*i)),
        toml::Value::Boolean(b) => Ok(Value::Bool(*b)),
        toml::Value::Datetime(dt) => Ok(Value::String(dt.to_string())),
        toml::Value::Float(f) => match Number::from_f64(*f) {
            Some(n) => Ok(Value::Number(n)),
            None => Err(non_finite(path, *f)),
        },
        toml::Value::Array(items) => {
            let mut out = Vec::with_capacity(items.len());
            for (i, item) in items.iter().enumerate() {
                out.push(convert(item, &format!("{path}[{i}]"))?);
            }
            Ok(Value::Array(out))
        }
        toml::Value::Table(table) => {
            let mut map = Map::new();
            for (key, item) in table {
                let path = if path.is_empty() {
                    key.clone()
                } else {
                    format!("{path}.{key}")
                };
                map.insert(key.clone(), convert(item, &path)?);
            }
            Ok(Value::Object(map))
        }
    }
}

fn non_finite(path: &str, f: f64) -> String {
    if path.is_empty() {
        format!("{f} is not a finite number")
    } else {
        format!("{path} is {f}, not a finite number")
    }
}
