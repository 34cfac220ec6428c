//! User identity and body-profile types.

use serde::{Deserialize, Serialize};

use super::{Email, UserId, UserRole};

/// An authenticated account as returned by the auth endpoints.
///
/// The session owns the user record; it only changes when new credentials
/// are set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Backend account ID.
    pub id: UserId,
    /// Login email.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Account role.
    pub role: UserRole,
    /// Whether body measurements have been recorded.
    #[serde(default)]
    pub profile_complete: bool,
    /// Body measurements, once recorded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<Measurements>,
    /// Avatar image URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
}

/// Errors from [`Measurements::validate`].
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeasurementError {
    /// A value is zero, negative, or not a finite number.
    #[error("{field} must be a positive number (got {value})")]
    NotPositive {
        /// Offending field name.
        field: &'static str,
        /// Offending value.
        value: f64,
    },
}

/// Body measurements in centimeters (weight in kilograms).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Measurements {
    pub height: f64,
    pub weight: f64,
    pub chest: f64,
    pub waist: f64,
    pub hips: f64,
    pub inseam: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shoulder: Option<f64>,
}

impl Measurements {
    /// Check that every recorded value is finite and strictly positive.
    ///
    /// # Errors
    ///
    /// Returns the first field that fails, in declaration order.
    pub fn validate(&self) -> Result<(), MeasurementError> {
        let required = [
            ("height", self.height),
            ("weight", self.weight),
            ("chest", self.chest),
            ("waist", self.waist),
            ("hips", self.hips),
            ("inseam", self.inseam),
        ];
        let optional = self.shoulder.map(|value| ("shoulder", value));

        for (field, value) in required.into_iter().chain(optional) {
            if !value.is_finite() || value <= 0.0 {
                return Err(MeasurementError::NotPositive { field, value });
            }
        }
        Ok(())
    }
}

/// Appearance settings for the 3D avatar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvatarCustomization {
    pub skin_tone: String,
    pub hair_style: String,
    pub body_type: String,
    pub height: f64,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn measurements() -> Measurements {
        Measurements {
            height: 172.0,
            weight: 64.5,
            chest: 92.0,
            waist: 76.0,
            hips: 98.0,
            inseam: 80.0,
            shoulder: None,
        }
    }

    #[test]
    fn test_valid_measurements() {
        assert!(measurements().validate().is_ok());
        let with_shoulder = Measurements {
            shoulder: Some(44.0),
            ..measurements()
        };
        assert!(with_shoulder.validate().is_ok());
    }

    #[test]
    fn test_non_positive_measurement_rejected() {
        let bad = Measurements {
            waist: 0.0,
            ..measurements()
        };
        assert_eq!(
            bad.validate(),
            Err(MeasurementError::NotPositive {
                field: "waist",
                value: 0.0
            })
        );
    }

    #[test]
    fn test_non_finite_shoulder_rejected() {
        let bad = Measurements {
            shoulder: Some(f64::NAN),
            ..measurements()
        };
        assert!(matches!(
            bad.validate(),
            Err(MeasurementError::NotPositive {
                field: "shoulder",
                ..
            })
        ));
    }

    #[test]
    fn test_user_wire_format() {
        let json = r#"{
            "id": "u1",
            "email": "nia@atelier.test",
            "name": "Nia",
            "role": "consumer",
            "profileComplete": true
        }"#;

        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.id.as_str(), "u1");
        assert!(user.profile_complete);
        assert_eq!(user.role, UserRole::Consumer);
        assert!(user.measurements.is_none());

        let out = serde_json::to_value(&user).unwrap();
        assert_eq!(out["profileComplete"], serde_json::json!(true));
        assert!(out.get("measurements").is_none());
    }

    #[test]
    fn test_user_profile_complete_defaults_false() {
        let json = r#"{"id":"u2","email":"a@b.c","name":"A","role":"store"}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(!user.profile_complete);
    }
}
