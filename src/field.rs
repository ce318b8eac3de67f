use serde::{Deserialize, Deserializer};

/// A request attribute that is either absent from the body or present with
/// a value. `null` deserializes as `Present` so it is never mistaken for a
/// missing key.
///
/// Use with `#[serde(default)]` so absent keys become [`Field::Absent`].
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Field<T> {
    #[default]
    Absent,
    Present(T),
}

impl<T> Field<T> {
    pub fn as_present(&self) -> Option<&T> {
        match self {
            Field::Absent => None,
            Field::Present(v) => Some(v),
        }
    }
}

impl<'de, T> Deserialize<'de> for Field<T>
where
    T: Deserialize<'de>,
{
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        T::deserialize(deserializer).map(Field::Present)
    }
}
