//! Typisierte Argument-Tupel
//!
//! Ein Signal transportiert eine Liste von JSON-Werten. `SignalArgumente`
//! verbindet diese Liste mit einem Rust-Tupel fester Stelligkeit.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Rust-Tupel das als Argumentliste eines Signals dient
pub trait SignalArgumente: Sized + Send + 'static {
    /// Stelligkeit des Tupels
    const ANZAHL: usize;

    /// Kodiert das Tupel in die Transportdarstellung
    fn in_werte(self) -> Result<Vec<Value>, serde_json::Error>;

    /// Dekodiert eine Argumentliste, `Err` mit Grund bei Abweichung
    fn aus_werten(werte: &[Value]) -> Result<Self, String>;
}

impl SignalArgumente for () {
    const ANZAHL: usize = 0;

    fn in_werte(self) -> Result<Vec<Value>, serde_json::Error> {
        Ok(Vec::new())
    }

    fn aus_werten(werte: &[Value]) -> Result<Self, String> {
        if werte.is_empty() {
            Ok(())
        } else {
            Err(format!("erwartet 0 Argumente, erhalten {}", werte.len()))
        }
    }
}

macro_rules! tupel_argumente {
    ($anzahl:expr; $($typ:ident $index:tt),+) => {
        impl<$($typ),+> SignalArgumente for ($($typ,)+)
        where
            $($typ: Serialize + DeserializeOwned + Send + 'static),+
        {
            const ANZAHL: usize = $anzahl;

            fn in_werte(self) -> Result<Vec<Value>, serde_json::Error> {
                Ok(vec![$(serde_json::to_value(self.$index)?),+])
            }

            fn aus_werten(werte: &[Value]) -> Result<Self, String> {
                if werte.len() != $anzahl {
                    return Err(format!(
                        "erwartet {} Argumente, erhalten {}",
                        $anzahl,
                        werte.len()
                    ));
                }
                Ok(($(
                    serde_json::from_value::<$typ>(werte[$index].clone())
                        .map_err(|e| format!("Argument {}: {}", $index, e))?,
                )+))
            }
        }
    };
}

tupel_argumente!(1; A 0);
tupel_argumente!(2; A 0, B 1);
tupel_argumente!(3; A 0, B 1, C 2);
tupel_argumente!(4; A 0, B 1, C 2, D 3);
tupel_argumente!(5; A 0, B 1, C 2, D 3, E 4);
tupel_argumente!(6; A 0, B 1, C 2, D 3, E 4, F 5);
