//! Rule evaluation over raw request data.

use std::collections::{BTreeMap, HashMap};

use validator::ValidateEmail;

use super::rules::{parse_rules, Rule};
use super::{FileMeta, UniqueCheck};
use crate::error::CoreError;

/// Extensions accepted by the `image` rule.
const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "gif"];

/// Result of validating one data map against a rule table.
#[derive(Debug, Clone, Default)]
pub struct ValidationOutcome {
    /// Field name → accumulated messages, in rule order.
    pub errors: BTreeMap<String, Vec<String>>,
}

impl ValidationOutcome {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// First message for a field, if any. Convenience for templates.
    pub fn first(&self, field: &str) -> Option<&str> {
        self.errors.get(field)?.first().map(String::as_str)
    }

    fn push(&mut self, field: &str, message: String) {
        self.errors.entry(field.to_owned()).or_default().push(message);
    }
}

/// Validate `data` (and uploaded `files`) against `rules`, a slice of
/// `(field, rule_string)` pairs.
///
/// Presence semantics: `required` fires on a missing, empty, or
/// whitespace-only value; every other value rule only applies when the field
/// carries a non-empty value, so optional fields validate cleanly when left
/// blank. Multiple violations on one field accumulate.
pub async fn validate<U: UniqueCheck>(
    data: &HashMap<String, String>,
    files: &HashMap<String, FileMeta>,
    rules: &[(&str, &str)],
    unique: &U,
) -> Result<ValidationOutcome, CoreError> {
    let mut outcome = ValidationOutcome::default();

    for (field, spec) in rules {
        let parsed = parse_rules(spec);
        let numeric_field = parsed
            .iter()
            .any(|r| matches!(r, Rule::Numeric | Rule::Integer));

        let value = data.get(*field).map(String::as_str).unwrap_or("");
        let present = !value.trim().is_empty();
        let file = files.get(*field);

        for rule in &parsed {
            match rule {
                Rule::Required => {
                    // A file upload satisfies `required` for file fields.
                    if !present && file.is_none() {
                        outcome.push(field, format!("El campo {field} es obligatorio."));
                    }
                }
                Rule::File => {
                    if file.is_none() {
                        outcome.push(field, format!("Debe adjuntar un archivo en {field}."));
                    }
                }
                Rule::Image => {
                    if let Some(meta) = file {
                        check_image(&mut outcome, field, meta);
                    }
                }
                _ if !present => {
                    // Value rules are skipped for absent optional fields.
                }
                Rule::Email => {
                    if !value.validate_email() {
                        outcome.push(field, format!("El campo {field} debe ser un correo válido."));
                    }
                }
                Rule::Min(bound) => {
                    if let Some(msg) = check_min(field, value, *bound, numeric_field) {
                        outcome.push(field, msg);
                    }
                }
                Rule::Max(bound) => {
                    if let Some(msg) = check_max(field, value, *bound, numeric_field) {
                        outcome.push(field, msg);
                    }
                }
                Rule::Numeric => {
                    if value.parse::<f64>().is_err() {
                        outcome.push(field, format!("El campo {field} debe ser numérico."));
                    }
                }
                Rule::Integer => {
                    if value.parse::<i64>().is_err() {
                        outcome.push(field, format!("El campo {field} debe ser un número entero."));
                    }
                }
                Rule::In(values) => {
                    if !values.iter().any(|v| v == value) {
                        outcome.push(field, format!("El campo {field} tiene un valor no permitido."));
                    }
                }
                Rule::Unique { table, column } => {
                    let column = column.as_deref().unwrap_or(field);
                    if unique.exists(table, column, value).await? {
                        outcome.push(field, format!("El valor de {field} ya está registrado."));
                    }
                }
                Rule::Confirmed => {
                    let confirmation = data
                        .get(&format!("{field}_confirmation"))
                        .map(String::as_str)
                        .unwrap_or("");
                    if value != confirmation {
                        outcome.push(field, format!("La confirmación de {field} no coincide."));
                    }
                }
                Rule::Regex(re) => {
                    if !re.is_match(value) {
                        outcome.push(field, format!("El formato de {field} no es válido."));
                    }
                }
                Rule::Text => {}
            }
        }
    }

    Ok(outcome)
}

fn check_min(field: &str, value: &str, bound: f64, numeric: bool) -> Option<String> {
    if numeric {
        let n = value.parse::<f64>().ok()?;
        (n < bound).then(|| format!("El campo {field} debe ser al menos {bound}."))
    } else {
        (value.chars().count() < bound as usize)
            .then(|| format!("El campo {field} debe tener al menos {bound} caracteres."))
    }
}

fn check_max(field: &str, value: &str, bound: f64, numeric: bool) -> Option<String> {
    if numeric {
        let n = value.parse::<f64>().ok()?;
        (n > bound).then(|| format!("El campo {field} no debe ser mayor que {bound}."))
    } else {
        (value.chars().count() > bound as usize)
            .then(|| format!("El campo {field} no debe exceder {bound} caracteres."))
    }
}

fn check_image(outcome: &mut ValidationOutcome, field: &str, meta: &FileMeta) {
    let extension_ok = meta
        .extension()
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()))
        .unwrap_or(false);
    if !extension_ok {
        outcome.push(
            field,
            format!("El archivo de {field} debe ser una imagen (jpg, jpeg, png, gif)."),
        );
    }
    if let Some(max) = meta.max_bytes {
        if meta.size_bytes > max {
            outcome.push(
                field,
                format!("El archivo de {field} supera el tamaño máximo permitido."),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::NoUniqueCheck;

    fn data(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    async fn run(
        pairs: &[(&str, &str)],
        rules: &[(&str, &str)],
    ) -> ValidationOutcome {
        validate(&data(pairs), &HashMap::new(), rules, &NoUniqueCheck)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn required_rejects_missing_empty_and_whitespace() {
        let rules = [("nombre", "required")];
        assert!(!run(&[], &rules).await.is_valid());
        assert!(!run(&[("nombre", "")], &rules).await.is_valid());
        assert!(!run(&[("nombre", "   ")], &rules).await.is_valid());
        assert!(run(&[("nombre", "Ana")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn email_shape_is_checked() {
        let rules = [("email", "required|email")];
        assert!(!run(&[("email", "not-an-email")], &rules).await.is_valid());
        assert!(!run(&[("email", "a@")], &rules).await.is_valid());
        assert!(run(&[("email", "a@x.com")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn min_max_count_characters_for_text_fields() {
        let rules = [("nombre", "required|string|min:2|max:5")];
        assert!(!run(&[("nombre", "A")], &rules).await.is_valid());
        assert!(!run(&[("nombre", "Anastasia")], &rules).await.is_valid());
        assert!(run(&[("nombre", "Ana")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn min_max_compare_numerically_for_numeric_fields() {
        let rules = [("cantidad", "required|numeric|min:0.1|max:1000")];
        assert!(!run(&[("cantidad", "0.05")], &rules).await.is_valid());
        assert!(!run(&[("cantidad", "1500")], &rules).await.is_valid());
        // "2.5" is only 3 characters but numerically in range.
        assert!(run(&[("cantidad", "2.5")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn integer_bounds_cover_urgency() {
        let rules = [("urgencia", "required|integer|min:1|max:4")];
        assert!(!run(&[("urgencia", "0")], &rules).await.is_valid());
        assert!(!run(&[("urgencia", "5")], &rules).await.is_valid());
        assert!(!run(&[("urgencia", "2.5")], &rules).await.is_valid());
        assert!(run(&[("urgencia", "3")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn confirmed_fails_iff_fields_differ() {
        let rules = [("password", "required|confirmed")];
        let bad = run(
            &[("password", "secret1"), ("password_confirmation", "secret2")],
            &rules,
        )
        .await;
        assert_eq!(
            bad.first("password"),
            Some("La confirmación de password no coincide.")
        );

        let good = run(
            &[("password", "secret1"), ("password_confirmation", "secret1")],
            &rules,
        )
        .await;
        assert!(good.is_valid());
    }

    #[tokio::test]
    async fn in_rule_checks_membership() {
        let rules = [("tipo_material", "required|in:plastico,papel")];
        assert!(!run(&[("tipo_material", "uranio")], &rules).await.is_valid());
        assert!(run(&[("tipo_material", "papel")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn optional_fields_skip_value_rules_when_blank() {
        let rules = [("descripcion", "string|max:500")];
        assert!(run(&[], &rules).await.is_valid());
        assert!(run(&[("descripcion", "")], &rules).await.is_valid());
    }

    #[tokio::test]
    async fn violations_accumulate_per_field() {
        let rules = [("email", "required|email|min:40")];
        let outcome = run(&[("email", "x")], &rules).await;
        assert_eq!(outcome.errors.get("email").map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn unique_rule_consults_the_injected_check() {
        struct AlwaysTaken;
        impl UniqueCheck for AlwaysTaken {
            async fn exists(&self, _: &str, _: &str, _: &str) -> Result<bool, CoreError> {
                Ok(true)
            }
        }

        let outcome = validate(
            &data(&[("email", "a@x.com")]),
            &HashMap::new(),
            &[("email", "required|email|unique:usuarios")],
            &AlwaysTaken,
        )
        .await
        .unwrap();
        assert_eq!(
            outcome.first("email"),
            Some("El valor de email ya está registrado.")
        );
    }

    #[tokio::test]
    async fn image_rule_checks_extension_and_size() {
        let mut files = HashMap::new();
        files.insert(
            "foto".to_string(),
            FileMeta {
                original_name: "captura.bmp".into(),
                size_bytes: 10,
                content_type: None,
                max_bytes: Some(5),
            },
        );
        let outcome = validate(
            &HashMap::new(),
            &files,
            &[("foto", "file|image")],
            &NoUniqueCheck,
        )
        .await
        .unwrap();
        // Both the extension and the size cap are violated.
        assert_eq!(outcome.errors.get("foto").map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn file_rule_requires_an_upload() {
        let outcome = validate(
            &HashMap::new(),
            &HashMap::new(),
            &[("foto", "file")],
            &NoUniqueCheck,
        )
        .await
        .unwrap();
        assert!(!outcome.is_valid());
    }
}
