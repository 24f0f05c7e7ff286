//! Permissive numeric deserialization

use serde::{Deserialize, Deserializer};

macro_rules! impl_deser_nomad_number {
    ($($name:ident => $u:ident),* $(,)?) => {
        $(
            #[doc = concat!("Permissive deserialization of `", stringify!($u), "`. Allows numbers, hex strings, and decimal strings")]
            pub fn $name<'de, D>(deserializer: D) -> Result<$u, D::Error>
            where
                D: Deserializer<'de>,
            {
                struct NumberOrNumberStringVisitor;

                impl<'de> serde::de::Visitor<'de> for NumberOrNumberStringVisitor {
                    type Value = $u;

                    fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                        formatter.write_str(
                            "an integer, a decimal string, or a 0x-prepended hexadecimal string",
                        )
                    }

                    fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $u::try_from(v)
                            .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(v), &self))
                    }

                    fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        $u::try_from(v)
                            .map_err(|_| E::invalid_value(serde::de::Unexpected::Signed(v), &self))
                    }

                    fn visit_str<E>(self, v: &str) -> Result<Self::Value, E>
                    where
                        E: serde::de::Error,
                    {
                        if let Ok(res) = v.parse() {
                            return Ok(res);
                        }

                        if let Some(stripped) = v.strip_prefix("0x") {
                            if stripped.is_empty() {
                                return Ok(0);
                            }
                            if let Ok(res) = $u::from_str_radix(stripped, 16) {
                                return Ok(res);
                            }
                        }

                        Err(E::invalid_value(serde::de::Unexpected::Str(v), &self))
                    }
                }

                deserializer.deserialize_any(NumberOrNumberStringVisitor)
            }
        )*
    };
}

impl_deser_nomad_number!(
    deser_nomad_u8 => u8,
    deser_nomad_u32 => u32,
    deser_nomad_u64 => u64,
);

/// Optional variant of [`deser_nomad_u64`]; `null` maps to `None`
pub fn deser_nomad_opt_u64<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deser_nomad_u64")] u64);

    Option::<Wrapper>::deserialize(deserializer).map(|w| w.map(|w| w.0))
}
