//! Profile slice: measurements and avatar.

use atelier_core::{AvatarCustomization, Measurements, User};

use super::resource::{AsyncResource, Lifecycle, Slice};
use crate::api::{AvatarUpload, Backend};
use crate::gate::ProfileStatus;

const MEASUREMENTS_FAILED: &str = "Failed to update measurements";
const AVATAR_FAILED: &str = "Failed to upload avatar";
const CUSTOMIZATION_FAILED: &str = "Failed to save avatar customization";

/// The signed-in shopper's body profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Profile {
    pub measurements: Option<Measurements>,
    pub avatar_url: Option<String>,
    pub avatar_customization: Option<AvatarCustomization>,
    /// Set once measurements are stored server-side.
    pub is_complete: bool,
}

#[derive(Debug)]
pub struct ProfileSlice {
    slice: Slice<Profile>,
}

impl Default for ProfileSlice {
    fn default() -> Self {
        Self {
            slice: Slice::new("profile", Profile::default()),
        }
    }
}

impl ProfileSlice {
    /// Initialise from the session user, at startup and after sign-in.
    pub fn seed(&self, user: &User) {
        self.slice.update(|profile| {
            *profile = Profile {
                measurements: user.measurements,
                avatar_url: user.avatar.clone(),
                avatar_customization: None,
                is_complete: user.profile_complete,
            };
        });
    }

    /// Store measurements. The profile becomes complete only when the
    /// backend accepts them.
    pub async fn update_measurements(
        &self,
        backend: &impl Backend,
        measurements: Measurements,
    ) -> Lifecycle {
        if let Err(e) = measurements.validate() {
            return self.slice.reject_locally("update_measurements", e.to_string());
        }
        self.slice
            .run(
                "update_measurements",
                MEASUREMENTS_FAILED,
                backend.submit_measurements(&measurements),
                |profile, stored| {
                    profile.measurements = Some(stored);
                    profile.is_complete = true;
                },
            )
            .await
    }

    pub async fn upload_avatar(&self, backend: &impl Backend, upload: AvatarUpload) -> Lifecycle {
        self.slice
            .run("upload_avatar", AVATAR_FAILED, backend.upload_avatar(upload), |profile, url| {
                profile.avatar_url = Some(url);
            })
            .await
    }

    pub async fn save_avatar_customization(
        &self,
        backend: &impl Backend,
        customization: AvatarCustomization,
    ) -> Lifecycle {
        self.slice
            .run(
                "save_avatar_customization",
                CUSTOMIZATION_FAILED,
                backend.save_avatar_customization(&customization),
                |profile, saved| profile.avatar_customization = Some(saved),
            )
            .await
    }

    pub fn reset(&self) {
        self.slice.reset();
    }

    /// What the access gate needs.
    #[must_use]
    pub fn status(&self) -> ProfileStatus {
        self.slice.read(|r| ProfileStatus {
            loading: r.is_loading(),
            complete: r.data().is_complete,
        })
    }

    #[must_use]
    pub fn snapshot(&self) -> AsyncResource<Profile> {
        self.slice.snapshot()
    }

    #[must_use]
    pub fn subscribe(&self) -> tokio::sync::watch::Receiver<AsyncResource<Profile>> {
        self.slice.subscribe()
    }
}
