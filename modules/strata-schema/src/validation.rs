//! Consistency checks between forms, key form, displays and sorts.
//!
//! Displays and sorts may only reference forms present in the attribute's
//! forms, and the key form must be one of them. These checks run on every
//! create and alteration before anything is sent.

use crate::error::SchemaError;
use crate::form::AttributeForm;
use crate::references::{AttributeDisplays, AttributeSorts, FormReference};

pub(crate) const DEFAULT_KEY_FORM_MESSAGE: &str =
    "Please select a `key_form` from the `forms` provided.";
const DISPLAYS_MESSAGE: &str = "FormReference present in `displays` is not present in `forms`.";
const SORTS_MESSAGE: &str = "FormReference present in `sort` is not present in `forms`.";

/// Validated key form.
///
/// With a single form the key form is that form, whatever was passed.
///
/// # Errors
/// Returns `SchemaError::Validation` if `forms` is empty or `key_form` does
/// not reference one of them. `message` replaces the default text of the
/// latter.
pub fn validate_key_form(
    key_form: Option<&FormReference>,
    forms: &[AttributeForm],
    message: Option<&str>,
) -> Result<FormReference, SchemaError> {
    match forms {
        [] => Err(SchemaError::validation("`forms` can not be empty.")),
        [only] => Ok(FormReference::by_name(only.name.clone())),
        _ => key_form
            .filter(|key| forms.iter().any(|form| form.is_referenced_by(key)))
            .cloned()
            .ok_or_else(|| SchemaError::validation(message.unwrap_or(DEFAULT_KEY_FORM_MESSAGE))),
    }
}

/// Validated displays.
///
/// Missing displays, or an empty report/browse list, are filled with
/// references to every form.
///
/// # Errors
/// Returns `SchemaError::Validation` if a display references a form not in
/// `forms`.
pub fn validate_displays(
    displays: Option<AttributeDisplays>,
    forms: &[AttributeForm],
) -> Result<AttributeDisplays, SchemaError> {
    let all = || forms.iter().map(AttributeForm::to_reference).collect::<Vec<_>>();
    let Some(mut displays) = displays else {
        return Ok(AttributeDisplays::new(all(), all()));
    };
    if displays.report_displays.is_empty() {
        displays.report_displays = all();
    }
    if displays.browse_displays.is_empty() {
        displays.browse_displays = all();
    }
    ensure_referenced(
        displays.report_displays.iter().chain(&displays.browse_displays),
        forms,
        DISPLAYS_MESSAGE,
    )?;
    Ok(displays)
}

/// Validated sorts; `None` when there are no sorts at all.
///
/// # Errors
/// Returns `SchemaError::Validation` if a sort references a form not in
/// `forms`.
pub fn validate_sorts(
    sorts: Option<AttributeSorts>,
    forms: &[AttributeForm],
) -> Result<Option<AttributeSorts>, SchemaError> {
    let Some(sorts) = sorts.filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    ensure_referenced(sorts.forms(), forms, SORTS_MESSAGE)?;
    Ok(Some(sorts))
}

fn ensure_referenced<'a>(
    mut references: impl Iterator<Item = &'a FormReference>,
    forms: &[AttributeForm],
    message: &str,
) -> Result<(), SchemaError> {
    if references.all(|r| forms.iter().any(|form| form.is_referenced_by(r))) {
        Ok(())
    } else {
        Err(SchemaError::validation(message))
    }
}

/// Displays without the first report and first browse reference to
/// `removed`, re-validated against the remaining `forms`.
pub(crate) fn remove_form_from_displays(
    removed: &AttributeForm,
    forms: &[AttributeForm],
    displays: Option<AttributeDisplays>,
) -> Result<AttributeDisplays, SchemaError> {
    let displays = displays.map(|mut d| {
        remove_first(&mut d.report_displays, |r| removed.is_referenced_by(r));
        remove_first(&mut d.browse_displays, |r| removed.is_referenced_by(r));
        d
    });
    validate_displays(displays, forms)
}

/// Sorts without the first report and first browse sort on `removed`,
/// re-validated against the remaining `forms`.
pub(crate) fn remove_form_from_sorts(
    removed: &AttributeForm,
    forms: &[AttributeForm],
    sorts: Option<AttributeSorts>,
) -> Result<Option<AttributeSorts>, SchemaError> {
    let sorts = sorts.map(|mut s| {
        for list in [&mut s.report_sorts, &mut s.browse_sorts].into_iter().flatten() {
            remove_first(list, |sort| removed.is_referenced_by(&sort.form));
        }
        s
    });
    validate_sorts(sorts, forms)
}

fn remove_first<T>(items: &mut Vec<T>, matches: impl Fn(&T) -> bool) {
    if let Some(index) = items.iter().position(matches) {
        items.remove(index);
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;
    use crate::expression::{Expression, FactExpression};
    use crate::references::{AttributeSort, ObjectSubType, SchemaObjectReference};

    fn form(id: &str, name: &str) -> AttributeForm {
        let table = SchemaObjectReference::new("T1", ObjectSubType::LogicalTable);
        let mut form = AttributeForm::local_create(crate::form::NewForm::new(
            name,
            vec![FactExpression::new(Expression::from_text(name), vec![table.clone()])],
            table,
        ))
        .unwrap();
        form.id = Some(id.to_owned());
        form
    }

    fn forms() -> Vec<AttributeForm> {
        vec![form("A", "ID"), form("B", "DESC")]
    }

    #[test]
    fn test_key_form_empty_forms() {
        let err = validate_key_form(None, &[], None).unwrap_err();
        assert_eq!(err.to_string(), "validation failed: `forms` can not be empty.");
    }

    #[test]
    fn test_key_form_single_form_is_auto_selected() {
        let only = [form("A", "ID")];
        let wrong = FormReference::by_id("ZZZ");
        assert_eq!(
            validate_key_form(Some(&wrong), &only, None).unwrap(),
            FormReference::by_name("ID")
        );
        assert_eq!(validate_key_form(None, &only, None).unwrap(), FormReference::by_name("ID"));
    }

    #[test]
    fn test_key_form_must_reference_a_form() {
        let forms = forms();
        assert!(validate_key_form(None, &forms, None).is_err());
        let err = validate_key_form(Some(&FormReference::by_id("C")), &forms, Some("pick again"))
            .unwrap_err();
        assert_eq!(err.to_string(), "validation failed: pick again");
        let key = FormReference::by_name("DESC");
        assert_eq!(validate_key_form(Some(&key), &forms, None).unwrap(), key);
    }

    #[test]
    fn test_stale_id_with_matching_name_resolves() {
        let forms = forms();
        let key = FormReference {
            id: Some("STALE".to_owned()),
            name: Some("DESC".to_owned()),
        };
        assert_eq!(validate_key_form(Some(&key), &forms, None).unwrap(), key);

        let displays = AttributeDisplays::new(vec![key.clone()], vec![FormReference::by_id("A")]);
        let displays = validate_displays(Some(displays), &forms).unwrap();
        assert_eq!(displays.report_displays, vec![key.clone()]);

        let sorts = AttributeSorts {
            report_sorts: Some(vec![AttributeSort::ascending(key)]),
            browse_sorts: None,
        };
        assert!(validate_sorts(Some(sorts), &forms).unwrap().is_some());
    }

    #[test]
    fn test_missing_displays_reference_every_form() {
        let displays = validate_displays(None, &forms()).unwrap();
        let expected = vec![FormReference::by_id("A"), FormReference::by_id("B")];
        assert_eq!(displays.report_displays, expected);
        assert_eq!(displays.browse_displays, expected);
    }

    #[test]
    fn test_empty_display_list_is_populated() {
        let displays = AttributeDisplays::new(vec![FormReference::by_id("B")], Vec::new());
        let displays = validate_displays(Some(displays), &forms()).unwrap();
        assert_eq!(displays.report_displays, vec![FormReference::by_id("B")]);
        assert_eq!(displays.browse_displays.len(), 2);
    }

    #[test]
    fn test_dangling_display_fails() {
        let displays = AttributeDisplays::new(vec![FormReference::by_name("LONG")], Vec::new());
        let err = validate_displays(Some(displays), &forms()).unwrap_err();
        assert!(err.to_string().contains("`displays`"));
    }

    #[test]
    fn test_sorts() {
        assert_eq!(validate_sorts(None, &forms()).unwrap(), None);
        assert_eq!(validate_sorts(Some(AttributeSorts::default()), &forms()).unwrap(), None);

        let ok = AttributeSorts {
            report_sorts: Some(vec![AttributeSort::ascending(FormReference::by_id("A"))]),
            browse_sorts: None,
        };
        assert_eq!(validate_sorts(Some(ok.clone()), &forms()).unwrap(), Some(ok));

        let dangling = AttributeSorts {
            report_sorts: None,
            browse_sorts: Some(vec![AttributeSort::descending(FormReference::by_id("C"))]),
        };
        let err = validate_sorts(Some(dangling), &forms()).unwrap_err();
        assert!(err.to_string().contains("`sort`"));
    }

    #[test]
    fn test_remove_form_cascades_to_displays_and_sorts() {
        let all = forms();
        let remaining = vec![all[1].clone()];
        let displays = AttributeDisplays::new(
            vec![FormReference::by_id("A"), FormReference::by_id("B")],
            vec![FormReference::by_id("A")],
        );
        let displays = remove_form_from_displays(&all[0], &remaining, Some(displays)).unwrap();
        assert_eq!(displays.report_displays, vec![FormReference::by_id("B")]);
        // emptied browse list is re-populated from the remaining forms
        assert_eq!(displays.browse_displays, vec![FormReference::by_id("B")]);

        let sorts = AttributeSorts {
            report_sorts: Some(vec![
                AttributeSort::ascending(FormReference::by_id("A")),
                AttributeSort::ascending(FormReference::by_id("B")),
            ]),
            browse_sorts: None,
        };
        let sorts = remove_form_from_sorts(&all[0], &remaining, Some(sorts))
            .unwrap()
            .unwrap();
        assert_eq!(
            sorts.report_sorts,
            Some(vec![AttributeSort::ascending(FormReference::by_id("B"))])
        );
    }
}
