use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use uuid::Uuid;

use crate::models::*;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Thread-safe SQLite store
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    /// Create a new store with the given database path
    pub fn new(db_path: &str) -> StoreResult<Self> {
        let conn = Connection::open(db_path)?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Create an in-memory store for testing
    pub fn in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        store.init_schema()?;
        Ok(store)
    }

    fn init_schema(&self) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS users (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT UNIQUE NOT NULL,
                image TEXT DEFAULT '',
                password_hash TEXT NOT NULL,
                bookmark TEXT DEFAULT '[]',
                followers TEXT DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS communities (
                id TEXT PRIMARY KEY,
                name TEXT UNIQUE NOT NULL,
                description TEXT DEFAULT '',
                members TEXT DEFAULT '[]',
                created_by_id TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (created_by_id) REFERENCES users(id)
            );

            CREATE TABLE IF NOT EXISTS questions (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                content TEXT DEFAULT '',
                created_by_id TEXT NOT NULL,
                community_id TEXT,
                upvotes TEXT DEFAULT '[]',
                downvotes TEXT DEFAULT '[]',
                likes TEXT DEFAULT '[]',
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (created_by_id) REFERENCES users(id),
                FOREIGN KEY (community_id) REFERENCES communities(id)
            );

            CREATE TABLE IF NOT EXISTS comments (
                id TEXT PRIMARY KEY,
                content TEXT DEFAULT '',
                created_by_id TEXT NOT NULL,
                question_id TEXT NOT NULL,
                community_id TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                FOREIGN KEY (created_by_id) REFERENCES users(id),
                FOREIGN KEY (question_id) REFERENCES questions(id),
                FOREIGN KEY (community_id) REFERENCES communities(id)
            );

            CREATE INDEX IF NOT EXISTS idx_questions_community_id ON questions(community_id);
            CREATE INDEX IF NOT EXISTS idx_questions_created_by_id ON questions(created_by_id);
            CREATE INDEX IF NOT EXISTS idx_questions_created_at ON questions(created_at);
            CREATE INDEX IF NOT EXISTS idx_comments_question_id ON comments(question_id);
            CREATE INDEX IF NOT EXISTS idx_comments_community_id ON comments(community_id);
            "#,
        )?;
        Ok(())
    }

    // ==================== User Operations ====================

    pub fn create_user(&self, user: &mut User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        user.id = Uuid::new_v4().to_string();
        let now = Utc::now();
        user.created_at = now;
        user.updated_at = now;

        let bookmark_json = serde_json::to_string(&user.bookmark)?;
        let followers_json = serde_json::to_string(&user.followers)?;

        conn.execute(
            r#"INSERT INTO users (id, name, email, image, password_hash, bookmark, followers, created_at, updated_at)
               VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)"#,
            params![
                &user.id,
                &user.name,
                &user.email,
                &user.image,
                &user.password_hash,
                &bookmark_json,
                &followers_json,
                user.created_at.to_rfc3339(),
                user.updated_at.to_rfc3339(),
            ],
        )
        .map_err(conflict_or_db)?;
        Ok(())
    }

    pub fn get_user(&self, id: &str) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT * FROM users WHERE id = ?1", params![id], |row| {
            row_to_user(row)
        })
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => StoreError::NotFound(format!("User {}", id)),
            _ => StoreError::Database(e),
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> StoreResult<User> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM users WHERE email = ?1",
            params![email],
            |row| row_to_user(row),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("User {}", email))
            }
            _ => StoreError::Database(e),
        })
    }

    pub fn update_user(&self, user: &mut User) -> StoreResult<()> {
        let conn = self.conn.lock().unwrap();
        user.updated_at = Utc::now();

        let bookmark_json = serde_json::to_string(&user.bookmark)?;
        let followers_json = serde_json::to_string(&user.followers)?;

        let rows = conn.execute(
            r#"UPDATE users SET name = ?1, image = ?2, bookmark = ?3, followers = ?4, updated_at = ?5
               WHERE id = ?6"#,
            params![
                &user.name,
                &user.image,
                &bookmark_json,
                &followers_json,
                user.updated_at.to_rfc3339(),
                &user.id,
            ],
        )?;

        if rows == 0 {
            return Err(StoreError::NotFound(format!("User {}", user.id)));
        }
        Ok(())
    }

    // ==================== Question Operations ====================

    pub fn create_question(&self, question: &mut Question) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            question.id = Uuid::new_v4().to_string();
            let now = Utc::now();
            question.created_at = now;
            question.updated_at = now;

            let upvotes_json = serde_json::to_string(&question.upvotes)?;
            let downvotes_json = serde_json::to_string(&question.downvotes)?;
            let likes_json = serde_json::to_string(&question.likes)?;

            conn.execute(
                r#"INSERT INTO questions (id, name, content, created_by_id, community_id,
                    upvotes, downvotes, likes, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)"#,
                params![
                    &question.id,
                    &question.name,
                    &question.content,
                    &question.created_by_id,
                    &question.community_id,
                    &upvotes_json,
                    &downvotes_json,
                    &likes_json,
                    question.created_at.to_rfc3339(),
                    question.updated_at.to_rfc3339(),
                ],
            )?;
        }
        self.hydrate_question(question)?;
        Ok(())
    }

    pub fn get_question(&self, id: &str) -> StoreResult<Question> {
        let mut question = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                &format!("{} WHERE id = ?1", QUESTION_SELECT),
                params![id],
                |row| row_to_question(row),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("Question {}", id))
                }
                _ => StoreError::Database(e),
            })?
        };
        self.hydrate_question(&mut question)?;
        Ok(question)
    }

    /// List questions with optional community/author scoping and a substring
    /// search on the name. Date sort keys order descending, name ascending.
    pub fn list_questions(
        &self,
        community_id: Option<&str>,
        created_by_id: Option<&str>,
        search: &str,
        order_by: &str,
        take: i64,
        skip: i64,
    ) -> StoreResult<Vec<Question>> {
        let (column, direction) = sort_column(order_by);
        let mut questions = {
            let conn = self.conn.lock().unwrap();
            let sql = format!(
                r#"{} WHERE name LIKE '%' || ?1 || '%'
                   AND (?2 IS NULL OR community_id = ?2)
                   AND (?3 IS NULL OR created_by_id = ?3)
                   ORDER BY {} {} LIMIT ?4 OFFSET ?5"#,
                QUESTION_SELECT, column, direction
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(
                params![search, community_id, created_by_id, take, skip],
                |row| row_to_question(row),
            )?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for question in &mut questions {
            self.hydrate_question(question)?;
        }
        Ok(questions)
    }

    /// Questions ordered by like count, then answer count, both descending.
    pub fn list_popular_questions(&self, take: i64, skip: i64) -> StoreResult<Vec<Question>> {
        let mut questions = {
            let conn = self.conn.lock().unwrap();
            let sql = format!(
                r#"{} ORDER BY json_array_length(likes) DESC, comment_count DESC
                   LIMIT ?1 OFFSET ?2"#,
                QUESTION_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![take, skip], |row| row_to_question(row))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for question in &mut questions {
            self.hydrate_question(question)?;
        }
        Ok(questions)
    }

    /// Questions whose id is in the given bookmark list. The page window is
    /// applied after the ordered id-scoped fetch.
    pub fn list_bookmarked_questions(
        &self,
        ids: &[String],
        order_by: &str,
        take: i64,
        skip: i64,
    ) -> StoreResult<Vec<Question>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }

        let (column, direction) = sort_column(order_by);
        let mut questions = {
            let conn = self.conn.lock().unwrap();
            let placeholders = vec!["?"; ids.len()].join(", ");
            let sql = format!(
                "{} WHERE id IN ({}) ORDER BY {} {}",
                QUESTION_SELECT, placeholders, column, direction
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(rusqlite::params_from_iter(ids.iter()), |row| {
                row_to_question(row)
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
                .into_iter()
                .skip(skip.max(0) as usize)
                .take(take.max(0) as usize)
                .collect::<Vec<_>>()
        };

        for question in &mut questions {
            self.hydrate_question(question)?;
        }
        Ok(questions)
    }

    /// Apply a full-replacement update scoped to the question's creator.
    /// An ownership mismatch matches zero rows and reads as NotFound.
    pub fn update_question(
        &self,
        id: &str,
        acting_user_id: &str,
        req: &UpdateQuestionRequest,
    ) -> StoreResult<Question> {
        let current = self.get_question(id)?;

        let name = req.name.clone().unwrap_or(current.name);
        let content = req.content.clone().unwrap_or(current.content);
        let upvotes = req.upvotes.clone().unwrap_or(current.upvotes);
        let downvotes = req.downvotes.clone().unwrap_or(current.downvotes);
        let likes = req.likes.clone().unwrap_or(current.likes);

        {
            let conn = self.conn.lock().unwrap();
            let rows = conn.execute(
                r#"UPDATE questions SET name = ?1, content = ?2, upvotes = ?3, downvotes = ?4,
                   likes = ?5, updated_at = ?6 WHERE id = ?7 AND created_by_id = ?8"#,
                params![
                    &name,
                    &content,
                    serde_json::to_string(&upvotes)?,
                    serde_json::to_string(&downvotes)?,
                    serde_json::to_string(&likes)?,
                    Utc::now().to_rfc3339(),
                    id,
                    acting_user_id,
                ],
            )?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("Question {}", id)));
            }
        }

        self.get_question(id)
    }

    /// Delete scoped to the creator; returns the deleted question.
    pub fn delete_question(&self, id: &str, acting_user_id: &str) -> StoreResult<Question> {
        let question = self.get_question(id)?;

        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "DELETE FROM questions WHERE id = ?1 AND created_by_id = ?2",
            params![id, acting_user_id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Question {}", id)));
        }
        Ok(question)
    }

    fn hydrate_question(&self, question: &mut Question) -> StoreResult<()> {
        question.created_by = self.get_user(&question.created_by_id).ok().map(Box::new);
        if let Some(community_id) = question.community_id.clone() {
            question.community = self.get_community(&community_id).ok().map(Box::new);
        }
        Ok(())
    }

    // ==================== Comment Operations ====================

    pub fn create_comment(&self, comment: &mut Comment) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            comment.id = Uuid::new_v4().to_string();
            let now = Utc::now();
            comment.created_at = now;
            comment.updated_at = now;

            conn.execute(
                r#"INSERT INTO comments (id, content, created_by_id, question_id, community_id, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    &comment.id,
                    &comment.content,
                    &comment.created_by_id,
                    &comment.question_id,
                    &comment.community_id,
                    comment.created_at.to_rfc3339(),
                    comment.updated_at.to_rfc3339(),
                ],
            )?;
        }
        comment.created_by = self.get_user(&comment.created_by_id).ok().map(Box::new);
        Ok(())
    }

    pub fn get_comment(&self, id: &str) -> StoreResult<Comment> {
        let mut comment = {
            let conn = self.conn.lock().unwrap();
            conn.query_row(
                "SELECT * FROM comments WHERE id = ?1",
                params![id],
                |row| row_to_comment(row),
            )
            .map_err(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => {
                    StoreError::NotFound(format!("Comment {}", id))
                }
                _ => StoreError::Database(e),
            })?
        };
        comment.created_by = self.get_user(&comment.created_by_id).ok().map(Box::new);
        Ok(comment)
    }

    pub fn list_comments(
        &self,
        question_id: Option<&str>,
        community_id: Option<&str>,
        take: i64,
        skip: i64,
    ) -> StoreResult<Vec<Comment>> {
        let mut comments = {
            let conn = self.conn.lock().unwrap();
            let mut stmt = conn.prepare(
                r#"SELECT * FROM comments
                   WHERE (?1 IS NULL OR question_id = ?1)
                   AND (?2 IS NULL OR community_id = ?2)
                   ORDER BY created_at DESC LIMIT ?3 OFFSET ?4"#,
            )?;
            let rows = stmt.query_map(params![question_id, community_id, take, skip], |row| {
                row_to_comment(row)
            })?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for comment in &mut comments {
            comment.created_by = self.get_user(&comment.created_by_id).ok().map(Box::new);
        }
        Ok(comments)
    }

    pub fn update_comment(
        &self,
        id: &str,
        acting_user_id: &str,
        content: &str,
    ) -> StoreResult<Comment> {
        {
            let conn = self.conn.lock().unwrap();
            let rows = conn.execute(
                r#"UPDATE comments SET content = ?1, updated_at = ?2
                   WHERE id = ?3 AND created_by_id = ?4"#,
                params![content, Utc::now().to_rfc3339(), id, acting_user_id],
            )?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("Comment {}", id)));
            }
        }
        self.get_comment(id)
    }

    pub fn delete_comment(&self, id: &str, acting_user_id: &str) -> StoreResult<Comment> {
        let comment = self.get_comment(id)?;

        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "DELETE FROM comments WHERE id = ?1 AND created_by_id = ?2",
            params![id, acting_user_id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Comment {}", id)));
        }
        Ok(comment)
    }

    // ==================== Community Operations ====================

    pub fn create_community(&self, community: &mut Community) -> StoreResult<()> {
        {
            let conn = self.conn.lock().unwrap();
            community.id = Uuid::new_v4().to_string();
            let now = Utc::now();
            community.created_at = now;
            community.updated_at = now;

            let members_json = serde_json::to_string(&community.members)?;

            conn.execute(
                r#"INSERT INTO communities (id, name, description, members, created_by_id, created_at, updated_at)
                   VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
                params![
                    &community.id,
                    &community.name,
                    &community.description,
                    &members_json,
                    &community.created_by_id,
                    community.created_at.to_rfc3339(),
                    community.updated_at.to_rfc3339(),
                ],
            )
            .map_err(conflict_or_db)?;
        }
        community.created_by = self.get_user(&community.created_by_id).ok().map(Box::new);
        Ok(())
    }

    pub fn get_community(&self, id: &str) -> StoreResult<Community> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            &format!("{} WHERE id = ?1", COMMUNITY_SELECT),
            params![id],
            |row| row_to_community(row),
        )
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => {
                StoreError::NotFound(format!("Community {}", id))
            }
            _ => StoreError::Database(e),
        })
    }

    /// Communities ordered by name ascending with a substring search.
    pub fn list_communities(&self, search: &str, take: i64, skip: i64) -> StoreResult<Vec<Community>> {
        let mut communities = {
            let conn = self.conn.lock().unwrap();
            let sql = format!(
                r#"{} WHERE name LIKE '%' || ?1 || '%'
                   ORDER BY name ASC LIMIT ?2 OFFSET ?3"#,
                COMMUNITY_SELECT
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map(params![search, take, skip], |row| row_to_community(row))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        for community in &mut communities {
            community.created_by = self.get_user(&community.created_by_id).ok().map(Box::new);
        }
        Ok(communities)
    }

    /// Communities whose member list contains the given user id. Membership
    /// lives in a JSON column, so the filter runs over the decoded rows.
    pub fn list_communities_for_member(&self, user_id: &str) -> StoreResult<Vec<Community>> {
        let communities = {
            let conn = self.conn.lock().unwrap();
            let sql = format!("{} ORDER BY name ASC", COMMUNITY_SELECT);
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt.query_map([], |row| row_to_community(row))?;
            rows.collect::<Result<Vec<_>, _>>()?
        };

        Ok(communities
            .into_iter()
            .filter(|c| c.members.iter().any(|m| m == user_id))
            .collect())
    }

    pub fn update_community(
        &self,
        id: &str,
        acting_user_id: &str,
        req: &UpdateCommunityRequest,
    ) -> StoreResult<Community> {
        let current = self.get_community(id)?;

        let name = req.name.clone().unwrap_or(current.name);
        let members = req.members.clone().unwrap_or(current.members);

        {
            let conn = self.conn.lock().unwrap();
            let rows = conn
                .execute(
                    r#"UPDATE communities SET name = ?1, members = ?2, updated_at = ?3
                       WHERE id = ?4 AND created_by_id = ?5"#,
                    params![
                        &name,
                        serde_json::to_string(&members)?,
                        Utc::now().to_rfc3339(),
                        id,
                        acting_user_id,
                    ],
                )
                .map_err(conflict_or_db)?;
            if rows == 0 {
                return Err(StoreError::NotFound(format!("Community {}", id)));
            }
        }

        let mut updated = self.get_community(id)?;
        updated.created_by = self.get_user(&updated.created_by_id).ok().map(Box::new);
        Ok(updated)
    }

    pub fn delete_community(&self, id: &str, acting_user_id: &str) -> StoreResult<Community> {
        let community = self.get_community(id)?;

        let conn = self.conn.lock().unwrap();
        let rows = conn.execute(
            "DELETE FROM communities WHERE id = ?1 AND created_by_id = ?2",
            params![id, acting_user_id],
        )?;
        if rows == 0 {
            return Err(StoreError::NotFound(format!("Community {}", id)));
        }
        Ok(community)
    }
}

const QUESTION_SELECT: &str = r#"SELECT id, name, content, created_by_id, community_id,
    upvotes, downvotes, likes, created_at, updated_at,
    (SELECT COUNT(*) FROM comments WHERE comments.question_id = questions.id) AS comment_count
    FROM questions"#;

const COMMUNITY_SELECT: &str = r#"SELECT id, name, description, members, created_by_id,
    created_at, updated_at,
    (SELECT COUNT(*) FROM questions WHERE questions.community_id = communities.id) AS question_count
    FROM communities"#;

/// Map a requested sort key to a column and direction. Unknown keys fall
/// back to creation time; only whitelisted columns reach the SQL text.
fn sort_column(order_by: &str) -> (&'static str, &'static str) {
    match order_by {
        "updatedAt" => ("updated_at", "DESC"),
        "name" => ("name", "ASC"),
        _ => ("created_at", "DESC"),
    }
}

fn conflict_or_db(e: rusqlite::Error) -> StoreError {
    match &e {
        rusqlite::Error::SqliteFailure(err, msg)
            if err.code == rusqlite::ErrorCode::ConstraintViolation =>
        {
            StoreError::Conflict(
                msg.clone()
                    .unwrap_or_else(|| "constraint violation".to_string()),
            )
        }
        _ => StoreError::Database(e),
    }
}

fn row_to_user(row: &rusqlite::Row) -> rusqlite::Result<User> {
    let bookmark_json: String = row.get("bookmark")?;
    let followers_json: String = row.get("followers")?;

    Ok(User {
        id: row.get("id")?,
        name: row.get("name")?,
        email: row.get("email")?,
        image: row.get("image")?,
        password_hash: row.get("password_hash")?,
        bookmark: serde_json::from_str(&bookmark_json).unwrap_or_default(),
        followers: serde_json::from_str(&followers_json).unwrap_or_default(),
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
    })
}

fn row_to_question(row: &rusqlite::Row) -> rusqlite::Result<Question> {
    let upvotes_json: String = row.get("upvotes")?;
    let downvotes_json: String = row.get("downvotes")?;
    let likes_json: String = row.get("likes")?;

    Ok(Question {
        id: row.get("id")?,
        name: row.get("name")?,
        content: row.get("content")?,
        created_by_id: row.get("created_by_id")?,
        community_id: row.get("community_id")?,
        upvotes: serde_json::from_str(&upvotes_json).unwrap_or_default(),
        downvotes: serde_json::from_str(&downvotes_json).unwrap_or_default(),
        likes: serde_json::from_str(&likes_json).unwrap_or_default(),
        comment_count: row.get("comment_count")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        created_by: None,
        community: None,
    })
}

fn row_to_comment(row: &rusqlite::Row) -> rusqlite::Result<Comment> {
    Ok(Comment {
        id: row.get("id")?,
        content: row.get("content")?,
        created_by_id: row.get("created_by_id")?,
        question_id: row.get("question_id")?,
        community_id: row.get("community_id")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        created_by: None,
    })
}

fn row_to_community(row: &rusqlite::Row) -> rusqlite::Result<Community> {
    let members_json: String = row.get("members")?;

    Ok(Community {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        members: serde_json::from_str(&members_json).unwrap_or_default(),
        created_by_id: row.get("created_by_id")?,
        question_count: row.get("question_count")?,
        created_at: parse_datetime(row.get::<_, String>("created_at")?),
        updated_at: parse_datetime(row.get::<_, String>("updated_at")?),
        created_by: None,
    })
}

fn parse_datetime(s: String) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}
