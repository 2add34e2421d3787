use campus_erp::{Clause, Domain, Operator};
use serde_json::Value;

/// Turns visitor form fields into an ORM domain, keeping allow-listed fields only.
#[derive(Debug, Clone, Default)]
pub struct FilterGuard {
    allowed: Vec<String>,
}

impl FilterGuard {
    #[must_use]
    pub const fn new(allowed: Vec<String>) -> Self {
        Self { allowed }
    }

    #[must_use]
    pub fn is_allowed(&self, field: &str) -> bool {
        self.allowed.iter().any(|f| f == field)
    }

    /// One `(field, in, [values])` clause per allowed field, in first-seen order.
    /// Integer-looking values are sent as integers.
    #[must_use]
    pub fn domain<'a, I>(&self, form: I) -> Domain
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut grouped: Vec<(&str, Vec<Value>)> = Vec::new();
        for (field, raw) in form {
            if !self.is_allowed(field) {
                continue;
            }
            let value = raw.trim().parse::<i64>().map_or_else(|_| Value::from(raw), Value::from);
            match grouped.iter_mut().find(|(f, _)| *f == field) {
                Some((_, values)) => values.push(value),
                None => grouped.push((field, vec![value])),
            }
        }

        grouped
            .into_iter()
            .map(|(field, values)| Clause::new(field, Operator::In, Value::Array(values)))
            .collect()
    }
}
