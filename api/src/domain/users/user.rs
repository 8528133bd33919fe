use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct UserRecord {
    pub id: Uuid,
    pub email: String,
    pub user_name: String,
    pub password_hash: Option<String>,
    pub profile: ProfileDetails,
    pub profile_image: Option<String>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl UserRecord {
    /// Same record with the credential stripped, for anything leaving the application layer.
    pub fn without_secret(mut self) -> Self {
        self.password_hash = None;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileDetails {
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
    pub bmi: Option<f64>,
    pub activities: Vec<serde_json::Value>,
}

/// Partial update of the profile. `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfilePatch {
    pub gender: Option<String>,
    pub height: Option<f64>,
    pub weight: Option<f64>,
    pub age: Option<i32>,
    pub goal: Option<String>,
    pub activity_level: Option<String>,
    pub bmi: Option<f64>,
    pub user_name: Option<String>,
    /// Written only by the profile image pipeline.
    pub profile_image: Option<String>,
}

impl ProfilePatch {
    pub fn profile_image(url: impl Into<String>) -> Self {
        Self {
            profile_image: Some(url.into()),
            ..Self::default()
        }
    }

    /// Blank strings and zero measurements count as "not provided".
    pub fn normalized(self) -> Self {
        fn text(v: Option<String>) -> Option<String> {
            v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
        }
        fn number(v: Option<f64>) -> Option<f64> {
            v.filter(|n| n.is_finite() && *n != 0.0)
        }
        Self {
            gender: text(self.gender),
            height: number(self.height),
            weight: number(self.weight),
            age: self.age.filter(|a| *a != 0),
            goal: text(self.goal),
            activity_level: text(self.activity_level),
            bmi: number(self.bmi),
            user_name: text(self.user_name),
            profile_image: text(self.profile_image),
        }
    }

    pub fn present_fields(&self) -> Vec<&'static str> {
        let mut out = Vec::new();
        if self.gender.is_some() {
            out.push("gender");
        }
        if self.height.is_some() {
            out.push("height");
        }
        if self.weight.is_some() {
            out.push("weight");
        }
        if self.age.is_some() {
            out.push("age");
        }
        if self.goal.is_some() {
            out.push("goal");
        }
        if self.activity_level.is_some() {
            out.push("activityLevel");
        }
        if self.bmi.is_some() {
            out.push("bmi");
        }
        if self.user_name.is_some() {
            out.push("userName");
        }
        if self.profile_image.is_some() {
            out.push("profileImage");
        }
        out
    }

    pub fn is_empty(&self) -> bool {
        self.present_fields().is_empty()
    }
}

/// Account-level fields that are not part of the public profile.
#[derive(Debug, Clone, Default)]
pub struct UserInfoPatch {
    pub user_name: Option<String>,
    pub password_hash: Option<String>,
}
