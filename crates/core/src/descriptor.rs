//! Declarative view configuration.
//!
//! One `ViewDescriptor` configures one list view: which collection it
//! reads, which columns it shows and exports, which filters it offers
//! and how it is ordered by default. The administrative screens are all
//! the same shape, so they are data here rather than code.

use crate::error::{ControllerError, ControllerResult};
use medoffice_export::Column;
use medoffice_types::{CollectionName, OrderingKey};

use crate::config::DEFAULT_PAGE_SIZE;

/// One offered filter input of a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterField {
    pub name: String,
    pub label: String,
}

impl FilterField {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }
}

/// Configuration of one administrative list view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewDescriptor {
    /// Report slug used for export file names.
    pub slug: String,
    /// Human title shown on screen and in report headers.
    pub title: String,
    pub collection: CollectionName,
    pub columns: Vec<Column>,
    pub filters: Vec<FilterField>,
    /// Explicit ordering key; `None` leaves ordering server-defined.
    pub default_ordering: Option<OrderingKey>,
    pub page_size: u32,
}

fn view(
    slug: &str,
    title: &str,
    collection: &str,
    ordering: Option<&str>,
    columns: &[(&str, &str)],
    filters: &[(&str, &str)],
) -> ControllerResult<ViewDescriptor> {
    let collection = CollectionName::new(collection)
        .map_err(|e| ControllerError::Config(format!("view {slug:?}: {e}")))?;
    let default_ordering = match ordering {
        Some(raw) => Some(
            OrderingKey::parse(raw)
                .map_err(|e| ControllerError::Config(format!("view {slug:?}: {e}")))?,
        ),
        None => None,
    };
    Ok(ViewDescriptor {
        slug: slug.to_string(),
        title: title.to_string(),
        collection,
        columns: columns
            .iter()
            .map(|(key, label)| Column::new(*key, *label))
            .collect(),
        filters: filters
            .iter()
            .map(|(name, label)| FilterField::new(*name, *label))
            .collect(),
        default_ordering,
        page_size: DEFAULT_PAGE_SIZE,
    })
}

/// The built-in administrative views.
pub fn builtin_views() -> ControllerResult<Vec<ViewDescriptor>> {
    Ok(vec![
        view(
            "patients",
            "Patients",
            "patients",
            Some("name"),
            &[
                ("name", "Name"),
                ("birth_date", "Birth date"),
                ("phone", "Phone"),
                ("email", "Email"),
                ("insurance", "Insurance"),
            ],
            &[("insurance", "Insurance"), ("city", "City")],
        )?,
        view(
            "appointments",
            "Appointments",
            "appointments",
            Some("-date"),
            &[
                ("date", "Date"),
                ("time", "Time"),
                ("patient_name", "Patient"),
                ("doctor_name", "Doctor"),
                ("status", "Status"),
            ],
            &[
                ("doctor", "Doctor"),
                ("status", "Status"),
                ("date", "Date"),
            ],
        )?,
        view(
            "consultations",
            "Consultations",
            "consultations",
            Some("-date"),
            &[
                ("date", "Date"),
                ("patient_name", "Patient"),
                ("doctor_name", "Doctor"),
                ("diagnosis", "Diagnosis"),
            ],
            &[("doctor", "Doctor"), ("patient", "Patient")],
        )?,
        view(
            "prescriptions",
            "Prescriptions",
            "prescriptions",
            Some("-issued_at"),
            &[
                ("issued_at", "Issued"),
                ("patient_name", "Patient"),
                ("doctor_name", "Doctor"),
                ("medication", "Medication"),
                ("dosage", "Dosage"),
            ],
            &[("doctor", "Doctor"), ("patient", "Patient")],
        )?,
        view(
            "exams",
            "Exams",
            "exams",
            Some("-requested_at"),
            &[
                ("requested_at", "Requested"),
                ("patient_name", "Patient"),
                ("kind", "Kind"),
                ("status", "Status"),
                ("result", "Result"),
            ],
            &[("kind", "Kind"), ("status", "Status")],
        )?,
        view(
            "schedules",
            "Schedules",
            "schedules",
            Some("doctor_name"),
            &[
                ("doctor_name", "Doctor"),
                ("weekday", "Weekday"),
                ("start_time", "Start"),
                ("end_time", "End"),
                ("room", "Room"),
            ],
            &[("doctor", "Doctor"), ("weekday", "Weekday")],
        )?,
        view(
            "users",
            "Users",
            "users",
            Some("username"),
            &[
                ("username", "Username"),
                ("full_name", "Full name"),
                ("role", "Role"),
                ("is_active", "Active"),
            ],
            &[("role", "Role"), ("is_active", "Active")],
        )?,
        view(
            "backups",
            "Backups",
            "backups",
            Some("-created_at"),
            &[
                ("created_at", "Created"),
                ("file", "File"),
                ("size", "Size"),
                ("status", "Status"),
            ],
            &[("status", "Status")],
        )?,
        view(
            "audit-log",
            "Audit log",
            "audit-log",
            Some("-timestamp"),
            &[
                ("timestamp", "When"),
                ("user", "User"),
                ("action", "Action"),
                ("target", "Target"),
            ],
            &[("user", "User"), ("action", "Action")],
        )?,
    ])
}

/// Looks a built-in view up by slug.
pub fn find_view(slug: &str) -> ControllerResult<ViewDescriptor> {
    builtin_views()?
        .into_iter()
        .find(|v| v.slug == slug)
        .ok_or_else(|| ControllerError::UnknownView(slug.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_builtin_views_are_well_formed() {
        let views = builtin_views().unwrap();
        assert_eq!(views.len(), 9);
        for view in &views {
            assert!(!view.slug.is_empty());
            assert!(!view.columns.is_empty());
            assert!(view.page_size >= 1);
        }
    }

    #[test]
    fn test_find_view_by_slug() {
        let backups = find_view("backups").unwrap();
        assert_eq!(backups.collection.as_str(), "backups");
        assert!(matches!(
            find_view("nope"),
            Err(ControllerError::UnknownView(_))
        ));
    }
}
