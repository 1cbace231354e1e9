//! SQLite storage backend for atrium, built on sqlx.

use chrono::{DateTime, Utc};
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use uuid::Uuid;

use atrium_storage::{
    CreateInvitationParams, CreatePostParams, CreateProfileParams, Invitation, InviteCode, Post,
    PostId, Profile, Role, Store, StoreError, UserId,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.atrium/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".atrium");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

// ───────────────────────────── Row mapping ─────────────────────────────

type InvitationRow = (String, String, i64, Option<String>, Option<i64>);
type ProfileRow = (
    String,
    String,
    String,
    String,
    i64,
    Option<String>,
    Option<String>,
    Option<String>,
    String,
    String,
    String,
    i64,
    i64,
    i64,
);
type PostRow = (String, String, String, String, String, i64);

fn timestamp(secs: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| StoreError::Backend(format!("bad timestamp: {secs}")))
}

fn json_list(raw: &str) -> Result<Vec<String>, StoreError> {
    serde_json::from_str(raw).map_err(|e| StoreError::Backend(e.to_string()))
}

fn role_from_str(raw: &str) -> Result<Role, StoreError> {
    match raw {
        "admin" => Ok(Role::Admin),
        "member" => Ok(Role::Member),
        other => Err(StoreError::Backend(format!("unknown role: {other}"))),
    }
}

fn role_to_str(role: Role) -> &'static str {
    match role {
        Role::Admin => "admin",
        Role::Member => "member",
    }
}

fn invitation_from_row(row: InvitationRow) -> Result<Invitation, StoreError> {
    let (code, email, sent_at, sent_by, used_at) = row;
    Ok(Invitation {
        code: InviteCode(code),
        email,
        sent_at: timestamp(sent_at)?,
        sent_by: sent_by.map(UserId),
        used_at: used_at.map(timestamp).transpose()?,
    })
}

fn profile_from_row(row: ProfileRow) -> Result<Profile, StoreError> {
    let (
        uid,
        email,
        first_name,
        last_name,
        class_year,
        bio,
        phone_number,
        profile_picture_url,
        company_ids,
        specialties,
        role,
        email_notifications,
        created_at,
        updated_at,
    ) = row;
    Ok(Profile {
        uid: UserId(uid),
        email,
        first_name,
        last_name,
        class_year: class_year as i32,
        bio,
        phone_number,
        profile_picture_url,
        company_ids: json_list(&company_ids)?,
        specialties: json_list(&specialties)?,
        role: role_from_str(&role)?,
        email_notifications: email_notifications != 0,
        created_at: timestamp(created_at)?,
        updated_at: timestamp(updated_at)?,
    })
}

fn post_from_row(row: PostRow) -> Result<Post, StoreError> {
    let (id, author_id, title, description, likes, created_at) = row;
    let id = Uuid::try_parse(&id).map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(Post {
        id: PostId(id),
        author_id: UserId(author_id),
        title,
        description,
        likes: json_list(&likes)?.into_iter().map(UserId).collect(),
        created_at: timestamp(created_at)?,
    })
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Invitations ─────────────────────────────

    async fn put_invitation(
        &self,
        params: &CreateInvitationParams,
    ) -> Result<Invitation, StoreError> {
        let sent_at = Utc::now().timestamp();
        sqlx::query("INSERT INTO invitations(code,email,sent_at,sent_by) VALUES(?,?,?,?)")
            .bind(&params.code.0)
            .bind(&params.email)
            .bind(sent_at)
            .bind(params.sent_by.as_ref().map(|u| u.0.clone()))
            .execute(&self.pool)
            .await
            .map_err(|e| {
                let s = e.to_string();
                if s.contains("UNIQUE") {
                    StoreError::AlreadyExists
                } else {
                    StoreError::Backend(s)
                }
            })?;
        Ok(Invitation {
            code: params.code.clone(),
            email: params.email.clone(),
            sent_at: timestamp(sent_at)?,
            sent_by: params.sent_by.clone(),
            used_at: None,
        })
    }

    async fn get_invitation_by_code(&self, code: &InviteCode) -> Result<Invitation, StoreError> {
        let row: Option<InvitationRow> = sqlx::query_as(
            "SELECT code,email,sent_at,sent_by,used_at FROM invitations WHERE code=?",
        )
        .bind(&code.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => invitation_from_row(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn latest_invitation_by_email(&self, email: &str) -> Result<Invitation, StoreError> {
        // rowid breaks ties between invitations sent within the same second
        let row: Option<InvitationRow> = sqlx::query_as(
            "SELECT code,email,sent_at,sent_by,used_at FROM invitations
             WHERE email=? ORDER BY sent_at DESC, rowid DESC LIMIT 1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => invitation_from_row(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn mark_invitation_used(&self, code: &InviteCode) -> Result<(), StoreError> {
        // Conditional write: only one of any number of concurrent redemptions
        // can observe used_at IS NULL.
        let result = sqlx::query("UPDATE invitations SET used_at=? WHERE code=? AND used_at IS NULL")
            .bind(Utc::now().timestamp())
            .bind(&code.0)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        if result.rows_affected() == 0 {
            let exists: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM invitations WHERE code=?")
                .bind(&code.0)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
            return Err(if exists.is_some() {
                StoreError::Conflict
            } else {
                StoreError::NotFound
            });
        }
        Ok(())
    }

    async fn list_invitations(&self) -> Result<Vec<Invitation>, StoreError> {
        let rows: Vec<InvitationRow> = sqlx::query_as(
            "SELECT code,email,sent_at,sent_by,used_at FROM invitations
             ORDER BY sent_at DESC, rowid DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(invitation_from_row).collect()
    }

    // ───────────────────────────── Profiles ────────────────────────────────

    async fn create_profile(&self, params: &CreateProfileParams) -> Result<Profile, StoreError> {
        let now = Utc::now().timestamp();
        let company_ids = serde_json::to_string(&params.company_ids)
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        let specialties = serde_json::to_string(&params.specialties)
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Re-running signup for the same uid replaces the profile; a clash on
        // another profile's email surfaces as AlreadyExists.
        sqlx::query(
            "INSERT INTO profiles(uid,email,first_name,last_name,class_year,bio,phone_number,
                                  profile_picture_url,company_ids,specialties,role,
                                  email_notifications,created_at,updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?,?,?)
             ON CONFLICT(uid) DO UPDATE SET
                 email=excluded.email, first_name=excluded.first_name,
                 last_name=excluded.last_name, class_year=excluded.class_year,
                 bio=excluded.bio, phone_number=excluded.phone_number,
                 profile_picture_url=excluded.profile_picture_url,
                 company_ids=excluded.company_ids, specialties=excluded.specialties,
                 role=excluded.role, email_notifications=excluded.email_notifications,
                 updated_at=excluded.updated_at",
        )
        .bind(&params.uid.0)
        .bind(&params.email)
        .bind(&params.first_name)
        .bind(&params.last_name)
        .bind(params.class_year as i64)
        .bind(&params.bio)
        .bind(&params.phone_number)
        .bind(&params.profile_picture_url)
        .bind(&company_ids)
        .bind(&specialties)
        .bind(role_to_str(params.role))
        .bind(params.email_notifications as i64)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            let s = e.to_string();
            if s.contains("UNIQUE") {
                StoreError::AlreadyExists
            } else {
                StoreError::Backend(s)
            }
        })?;

        self.get_profile(&params.uid).await
    }

    async fn get_profile(&self, uid: &UserId) -> Result<Profile, StoreError> {
        let row: Option<ProfileRow> = sqlx::query_as(
            "SELECT uid,email,first_name,last_name,class_year,bio,phone_number,
                    profile_picture_url,company_ids,specialties,role,
                    email_notifications,created_at,updated_at
             FROM profiles WHERE uid=?",
        )
        .bind(&uid.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            Some(row) => profile_from_row(row),
            None => Err(StoreError::NotFound),
        }
    }

    async fn list_profiles(&self) -> Result<Vec<Profile>, StoreError> {
        let rows: Vec<ProfileRow> = sqlx::query_as(
            "SELECT uid,email,first_name,last_name,class_year,bio,phone_number,
                    profile_picture_url,company_ids,specialties,role,
                    email_notifications,created_at,updated_at
             FROM profiles ORDER BY last_name, first_name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(profile_from_row).collect()
    }

    // ───────────────────────────── Posts ───────────────────────────────────

    async fn create_post(&self, params: &CreatePostParams) -> Result<Post, StoreError> {
        let id = PostId::new();
        let created_at = Utc::now().timestamp();
        sqlx::query("INSERT INTO posts(id,author_id,title,description,created_at) VALUES(?,?,?,?,?)")
            .bind(id.0.to_string())
            .bind(&params.author_id.0)
            .bind(&params.title)
            .bind(&params.description)
            .bind(created_at)
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Post {
            id,
            author_id: params.author_id.clone(),
            title: params.title.clone(),
            description: params.description.clone(),
            likes: vec![],
            created_at: timestamp(created_at)?,
        })
    }

    async fn list_posts(&self) -> Result<Vec<Post>, StoreError> {
        let rows: Vec<PostRow> = sqlx::query_as(
            "SELECT id,author_id,title,description,likes,created_at FROM posts
             ORDER BY created_at DESC, id DESC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        rows.into_iter().map(post_from_row).collect()
    }
}
