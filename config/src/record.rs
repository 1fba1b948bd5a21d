//! Dynamic records for types declared only in configuration.

use kiln_types::{ConstructionError, Instance, OrderedArguments, TypeDescriptor, Value};
use serde_json::Map;

/// Instance built for a configuration-declared type: each declared
/// parameter name mapped to its bound value.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    type_name: String,
    fields: Map<String, Value>,
}

impl Record {
    #[must_use]
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    #[must_use]
    pub fn fields(&self) -> &Map<String, Value> {
        &self.fields
    }

    pub fn set(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.fields.insert(field.into(), value)
    }

    /// Constructor for `descriptor`: required parameters must not be `null`.
    pub(crate) fn factory(
        descriptor: &TypeDescriptor,
    ) -> impl Fn(OrderedArguments) -> Result<Instance, ConstructionError> + Send + Sync + 'static {
        let type_name = descriptor.name().to_string();
        let parameters: Vec<(String, bool)> = descriptor
            .parameters()
            .iter()
            .map(|p| (p.name().to_string(), p.is_optional()))
            .collect();

        move |args: OrderedArguments| {
            let mut fields = Map::new();
            for (position, (name, optional)) in parameters.iter().enumerate() {
                let value = args.get(position).cloned().unwrap_or(Value::Null);
                if value.is_null() && !optional {
                    return Err(ConstructionError::MissingArgument {
                        name: name.clone(),
                        position,
                    });
                }
                fields.insert(name.clone(), value);
            }
            let record = Record {
                type_name: type_name.clone(),
                fields,
            };
            Ok(Instance::new(type_name.clone(), record))
        }
    }
}

#[cfg(test)]
mod tests {
    use kiln_types::{ConstructionError, OrderedArguments, TypeDescriptor, Value};
    use serde_json::json;

    use super::Record;

    #[test]
    fn factory_maps_names_to_values() {
        let ty = TypeDescriptor::new("Mailer")
            .required("host")
            .optional("port", 25);
        let build = Record::factory(&ty);
        let args = OrderedArguments::new(vec![json!("smtp"), json!(25)]);
        let instance = build(args).unwrap();
        let record = instance.downcast_ref::<Record>().unwrap();
        assert_eq!(record.type_name(), "Mailer");
        assert_eq!(record.get("host"), Some(&json!("smtp")));
        assert_eq!(record.get("port"), Some(&json!(25)));
    }

    #[test]
    fn factory_rejects_null_required_values() {
        let ty = TypeDescriptor::new("Mailer").required("host");
        let build = Record::factory(&ty);
        let err = build(OrderedArguments::new(vec![Value::Null])).unwrap_err();
        assert_eq!(
            err,
            ConstructionError::MissingArgument {
                name: "host".to_string(),
                position: 0,
            }
        );
    }

    #[test]
    fn optional_null_is_accepted() {
        let ty = TypeDescriptor::new("Logger").optional("sink", Value::Null);
        let build = Record::factory(&ty);
        let instance = build(OrderedArguments::new(vec![Value::Null])).unwrap();
        let mut record = instance.downcast::<Record>().unwrap();
        assert_eq!(record.get("sink"), Some(&Value::Null));
        record.set("sink", json!("stderr"));
        assert_eq!(record.fields().len(), 1);
        assert_eq!(record.get("sink"), Some(&json!("stderr")));
    }
}
