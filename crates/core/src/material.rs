//! Fixed allow-lists for report fields: material type, report status, urgency.

use serde::{Deserialize, Serialize};

/// Waste/recyclable material categories accepted on a report.
///
/// The string forms (lowercase Spanish) are what the web forms submit and
/// what the `reportes.tipo_material` column stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MaterialType {
    Plastico,
    Papel,
    Vidrio,
    Metal,
    Organico,
    Electronico,
    Otro,
}

impl MaterialType {
    /// All accepted values, in display order.
    pub const ALL: [MaterialType; 7] = [
        MaterialType::Plastico,
        MaterialType::Papel,
        MaterialType::Vidrio,
        MaterialType::Metal,
        MaterialType::Organico,
        MaterialType::Electronico,
        MaterialType::Otro,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaterialType::Plastico => "plastico",
            MaterialType::Papel => "papel",
            MaterialType::Vidrio => "vidrio",
            MaterialType::Metal => "metal",
            MaterialType::Organico => "organico",
            MaterialType::Electronico => "electronico",
            MaterialType::Otro => "otro",
        }
    }

    /// Human-facing label for templates.
    pub fn label(&self) -> &'static str {
        match self {
            MaterialType::Plastico => "Plástico",
            MaterialType::Papel => "Papel y cartón",
            MaterialType::Vidrio => "Vidrio",
            MaterialType::Metal => "Metal",
            MaterialType::Organico => "Orgánico",
            MaterialType::Electronico => "Electrónico",
            MaterialType::Otro => "Otro",
        }
    }

    /// The `in:` rule argument listing every accepted value.
    pub fn rule_values() -> String {
        MaterialType::ALL
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for MaterialType {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MaterialType::ALL
            .into_iter()
            .find(|m| m.as_str() == s)
            .ok_or_else(|| crate::CoreError::Validation(format!("tipo de material desconocido: {s}")))
    }
}

impl std::fmt::Display for MaterialType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lifecycle status of a report. Owners create reports as `Pendiente`;
/// only admins move them forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pendiente,
    EnProceso,
    Resuelto,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [
        ReportStatus::Pendiente,
        ReportStatus::EnProceso,
        ReportStatus::Resuelto,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportStatus::Pendiente => "pendiente",
            ReportStatus::EnProceso => "en_proceso",
            ReportStatus::Resuelto => "resuelto",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ReportStatus::Pendiente => "Pendiente",
            ReportStatus::EnProceso => "En proceso",
            ReportStatus::Resuelto => "Resuelto",
        }
    }

    pub fn rule_values() -> String {
        ReportStatus::ALL
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl std::str::FromStr for ReportStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ReportStatus::ALL
            .into_iter()
            .find(|v| v.as_str() == s)
            .ok_or_else(|| crate::CoreError::Validation(format!("estado desconocido: {s}")))
    }
}

impl std::fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Urgency runs 1 (low) to 4 (critical).
pub const URGENCY_MIN: i64 = 1;
pub const URGENCY_MAX: i64 = 4;

pub fn urgency_label(urgencia: i64) -> &'static str {
    match urgencia {
        1 => "Baja",
        2 => "Media",
        3 => "Alta",
        4 => "Crítica",
        _ => "Desconocida",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn material_round_trips_through_str() {
        for m in MaterialType::ALL {
            assert_eq!(MaterialType::from_str(m.as_str()).unwrap(), m);
        }
    }

    #[test]
    fn unknown_material_is_rejected() {
        assert!(MaterialType::from_str("uranio").is_err());
    }

    #[test]
    fn status_round_trips_through_str() {
        for s in ReportStatus::ALL {
            assert_eq!(ReportStatus::from_str(s.as_str()).unwrap(), s);
        }
        assert_eq!(
            ReportStatus::from_str("en_proceso").unwrap(),
            ReportStatus::EnProceso
        );
    }

    #[test]
    fn rule_values_list_every_variant() {
        let values = MaterialType::rule_values();
        assert_eq!(values, "plastico,papel,vidrio,metal,organico,electronico,otro");
        assert_eq!(ReportStatus::rule_values(), "pendiente,en_proceso,resuelto");
    }
}
