use serde::{Deserialize, Deserializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum IntOrString {
    Int(i64),
    Str(String),
}

// html selects on the web client post their values as strings, "3" is accepted as 3
pub fn deserialize_i64_from_int_or_string<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match IntOrString::deserialize(deserializer)? {
        IntOrString::Int(v) => Ok(v),
        IntOrString::Str(value) => value.trim().parse::<i64>().map_err(|_| {
            serde::de::Error::custom(format!("Wrong value {value}, can not parse to i64"))
        }),
    }
}
