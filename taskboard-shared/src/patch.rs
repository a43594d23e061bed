/// Partial-update helpers
///
/// Update payloads distinguish three states for a nullable field:
///
/// | JSON                 | Rust                 | Meaning          |
/// |----------------------|----------------------|------------------|
/// | field absent         | `None`               | leave unchanged  |
/// | `"field": null`      | `Some(None)`         | clear the value  |
/// | `"field": value`     | `Some(Some(value))`  | overwrite        |
///
/// Serde collapses the first two by default, so nullable patch fields use
/// `#[serde(default, deserialize_with = "double_option")]`.
///
/// # Example
///
/// ```
/// use serde::Deserialize;
/// use taskboard_shared::patch::double_option;
///
/// #[derive(Deserialize)]
/// struct Patch {
///     #[serde(default, deserialize_with = "double_option")]
///     description: Option<Option<String>>,
/// }
///
/// let absent: Patch = serde_json::from_str("{}").unwrap();
/// assert_eq!(absent.description, None);
///
/// let cleared: Patch = serde_json::from_str(r#"{"description": null}"#).unwrap();
/// assert_eq!(cleared.description, Some(None));
/// ```

use serde::{Deserialize, Deserializer};

/// Deserializes a present field (even `null`) as `Some(..)`
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Overwrites `target` when the patch supplied a value
pub fn apply<T>(target: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *target = value;
    }
}
