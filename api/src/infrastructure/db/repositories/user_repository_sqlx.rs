use async_trait::async_trait;
use sqlx::Row;
use sqlx::postgres::PgRow;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::user::{ProfileDetails, ProfilePatch, UserInfoPatch, UserRecord};
use crate::infrastructure::db::PgPool;

const USER_COLUMNS: &str = "id, email, user_name, password_hash, gender, height, weight, age, goal, \
     activity_level, bmi, activities, profile_image, created_at, updated_at";

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_user(r: &PgRow) -> UserRecord {
    let activities = match r.try_get::<serde_json::Value, _>("activities") {
        Ok(serde_json::Value::Array(items)) => items,
        _ => Vec::new(),
    };
    UserRecord {
        id: r.get("id"),
        email: r.get("email"),
        user_name: r.get("user_name"),
        password_hash: r.try_get("password_hash").ok(),
        profile: ProfileDetails {
            gender: r.try_get("gender").ok().flatten(),
            height: r.try_get("height").ok().flatten(),
            weight: r.try_get("weight").ok().flatten(),
            age: r.try_get("age").ok().flatten(),
            goal: r.try_get("goal").ok().flatten(),
            activity_level: r.try_get("activity_level").ok().flatten(),
            bmi: r.try_get("bmi").ok().flatten(),
            activities,
        },
        profile_image: r.try_get("profile_image").ok().flatten(),
        created_at: r.get("created_at"),
        updated_at: r.get("updated_at"),
    }
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        email: &str,
        user_name: &str,
        password_hash: &str,
    ) -> anyhow::Result<UserRecord> {
        let sql = format!(
            "INSERT INTO users (email, user_name, password_hash) VALUES ($1, $2, $3) RETURNING {USER_COLUMNS}"
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .bind(user_name)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await?;
        Ok(map_user(&row))
    }

    async fn find_by_email(&self, email: &str) -> anyhow::Result<Option<UserRecord>> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        let row = sqlx::query(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn update_profile(
        &self,
        email: &str,
        patch: &ProfilePatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        // Single statement: the row is either fully patched or untouched.
        let sql = format!(
            r#"UPDATE users SET
                 gender = COALESCE($2, gender),
                 height = COALESCE($3, height),
                 weight = COALESCE($4, weight),
                 age = COALESCE($5, age),
                 goal = COALESCE($6, goal),
                 activity_level = COALESCE($7, activity_level),
                 bmi = COALESCE($8, bmi),
                 user_name = COALESCE($9, user_name),
                 profile_image = COALESCE($10, profile_image),
                 updated_at = now()
               WHERE email = $1
               RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .bind(patch.gender.as_deref())
            .bind(patch.height)
            .bind(patch.weight)
            .bind(patch.age)
            .bind(patch.goal.as_deref())
            .bind(patch.activity_level.as_deref())
            .bind(patch.bmi)
            .bind(patch.user_name.as_deref())
            .bind(patch.profile_image.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }

    async fn update_user_info(
        &self,
        email: &str,
        patch: &UserInfoPatch,
    ) -> anyhow::Result<Option<UserRecord>> {
        let sql = format!(
            r#"UPDATE users SET
                 user_name = COALESCE($2, user_name),
                 password_hash = COALESCE($3, password_hash),
                 updated_at = now()
               WHERE email = $1
               RETURNING {USER_COLUMNS}"#
        );
        let row = sqlx::query(&sql)
            .bind(email)
            .bind(patch.user_name.as_deref())
            .bind(patch.password_hash.as_deref())
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.as_ref().map(map_user))
    }
}
