//! Live session lifecycle: create, look up, mutate, end.
//!
//! A session row is `Active` until ended, then `Ended` forever. Pause is a
//! flag inside the active state, not a row state. Teacher operations require
//! an active row owned by the caller; student operations only need the code.

use std::sync::Arc;

use chrono::Utc;
use classdash_core::error::CoreError;
use classdash_core::session::{PollOption, PollTally, Screenshot, SessionState};
use classdash_core::session_code::{generate_unique_code, normalize_code};
use classdash_core::types::Timestamp;
use classdash_core::widget::DashboardConfig;
use classdash_db::models::session::{NewSessionRow, SessionRow};
use classdash_db::repositories::SessionRepo;
use classdash_db::store::RowStore;
use serde_json::Value;

use crate::error::AppResult;

/// Result of a successful join.
#[derive(Debug, Clone)]
pub struct JoinedSession {
    pub state: SessionState,
    pub teacher_email: String,
}

/// A teacher's currently running session.
#[derive(Debug, Clone)]
pub struct ActiveSession {
    pub code: String,
    pub state: SessionState,
}

/// The session state machine over the `sessions` table.
pub struct SessionManager {
    store: Arc<dyn RowStore>,
}

fn session_not_found(code: &str) -> CoreError {
    CoreError::NotFound {
        entity: "Session",
        key: code.to_string(),
    }
}

impl SessionManager {
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self { store }
    }

    fn store(&self) -> &dyn RowStore {
        self.store.as_ref()
    }

    // -----------------------------------------------------------------------
    // Row helpers
    // -----------------------------------------------------------------------

    /// Load the active row for `code` and decode its state.
    async fn load_active(&self, code: &str) -> AppResult<(SessionRow, SessionState)> {
        let code = normalize_code(code);
        let row = SessionRepo::find_active_by_code(self.store(), &code)
            .await?
            .ok_or_else(|| session_not_found(&code))?;
        let state = SessionState::decode(&row.session_state_json)?;
        Ok((row, state))
    }

    /// Like [`Self::load_active`] but also require `teacher_email` to own it.
    async fn load_owned(
        &self,
        code: &str,
        teacher_email: &str,
    ) -> AppResult<(SessionRow, SessionState)> {
        let (row, state) = self.load_active(code).await?;
        if !row.is_owned_by(teacher_email) {
            return Err(CoreError::Unauthorized(format!(
                "Only the teacher who started session {} can change it",
                row.code
            ))
            .into());
        }
        Ok((row, state))
    }

    async fn save_state(&self, row: &SessionRow, state: &SessionState) -> AppResult<()> {
        SessionRepo::write_state(self.store(), row.row, state.encode()?).await?;
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Teacher lifecycle
    // -----------------------------------------------------------------------

    /// Start a session from `config`, ending any the teacher already runs.
    ///
    /// Returns the new join code.
    pub async fn create_session(
        &self,
        teacher_email: &str,
        config: DashboardConfig,
    ) -> AppResult<String> {
        let ended = SessionRepo::deactivate_all_for_teacher(self.store(), teacher_email).await?;
        if ended > 0 {
            tracing::info!(teacher = %teacher_email, ended, "Ended previous sessions");
        }

        let active_codes = SessionRepo::active_codes(self.store()).await?;
        let generated = {
            let mut rng = rand::rng();
            generate_unique_code(&mut rng, |c| active_codes.contains(c))
        };
        if !generated.unique {
            tracing::warn!(
                code = %generated.code,
                attempts = generated.attempts,
                "Session code collides with an active session; accepting it",
            );
        }

        let state = SessionState::from_config(config);
        let new_row = NewSessionRow {
            code: generated.code.clone(),
            teacher_email: teacher_email.to_string(),
            session_state_json: state.encode()?,
            created_at: Utc::now(),
        };
        SessionRepo::create(self.store(), new_row).await?;

        tracing::info!(code = %generated.code, teacher = %teacher_email, "Session created");
        Ok(generated.code)
    }

    /// Teacher structural push, filtered through the interactive-widget merge rule.
    pub async fn update_session(
        &self,
        code: &str,
        teacher_email: &str,
        config: DashboardConfig,
    ) -> AppResult<()> {
        let (row, mut state) = self.load_owned(code, teacher_email).await?;
        state.apply_structural_push(config);
        self.save_state(&row, &state).await?;

        tracing::debug!(code = %row.code, widgets = state.widgets.len(), "Session updated");
        Ok(())
    }

    pub async fn set_paused(
        &self,
        code: &str,
        teacher_email: &str,
        paused: bool,
    ) -> AppResult<bool> {
        let (row, mut state) = self.load_owned(code, teacher_email).await?;
        state.paused = paused;
        self.save_state(&row, &state).await?;

        tracing::info!(code = %row.code, paused, "Session pause toggled");
        Ok(paused)
    }

    pub async fn end_session(&self, code: &str, teacher_email: &str) -> AppResult<()> {
        let (row, _) = self.load_owned(code, teacher_email).await?;
        SessionRepo::deactivate(self.store(), row.row).await?;

        tracing::info!(code = %row.code, teacher = %teacher_email, "Session ended");
        Ok(())
    }

    pub async fn get_active_session(
        &self,
        teacher_email: &str,
    ) -> AppResult<Option<ActiveSession>> {
        let Some(row) = SessionRepo::find_active_by_teacher(self.store(), teacher_email).await?
        else {
            return Ok(None);
        };
        let state = SessionState::decode(&row.session_state_json)?;
        Ok(Some(ActiveSession {
            code: row.code,
            state,
        }))
    }

    // -----------------------------------------------------------------------
    // Lookups
    // -----------------------------------------------------------------------

    /// Student join. Ended and unknown codes are both `NotFound`.
    pub async fn join_session(&self, code: &str) -> AppResult<JoinedSession> {
        let (row, state) = self.load_active(code).await?;
        Ok(JoinedSession {
            state,
            teacher_email: row.teacher_email,
        })
    }

    /// Polling read. Distinguishes `SessionEnded` from `NotFound`.
    pub async fn get_session_data(&self, code: &str) -> AppResult<SessionState> {
        let code = normalize_code(code);
        let row = SessionRepo::find_by_code(self.store(), &code)
            .await?
            .ok_or_else(|| session_not_found(&code))?;
        if !row.active {
            return Err(CoreError::SessionEnded { code }.into());
        }
        Ok(SessionState::decode(&row.session_state_json)?)
    }

    // -----------------------------------------------------------------------
    // Student writes
    // -----------------------------------------------------------------------

    /// Overwrite `data` on an interactive widget. Refused while paused.
    pub async fn update_widget_state(
        &self,
        code: &str,
        widget_id: &str,
        data: Value,
    ) -> AppResult<()> {
        let (row, mut state) = self.load_active(code).await?;
        state.update_widget_data(widget_id, data)?;
        self.save_state(&row, &state).await
    }

    /// Count a vote and return that widget's tally. Allowed while paused.
    pub async fn submit_poll_response(
        &self,
        code: &str,
        widget_id: &str,
        option: PollOption,
    ) -> AppResult<PollTally> {
        let (row, mut state) = self.load_active(code).await?;
        let tally = state.record_poll_vote(widget_id, option);
        self.save_state(&row, &state).await?;
        Ok(tally)
    }

    pub async fn submit_screenshot(
        &self,
        code: &str,
        student_email: &str,
        image: String,
    ) -> AppResult<()> {
        let (row, mut state) = self.load_active(code).await?;
        state.add_screenshot(student_email.to_string(), image, Utc::now());
        self.save_state(&row, &state).await?;

        tracing::debug!(code = %row.code, student = %student_email, "Screenshot submitted");
        Ok(())
    }

    // -----------------------------------------------------------------------
    // Screenshot rounds (teacher)
    // -----------------------------------------------------------------------

    /// Open a new capture round. Returns the request timestamp.
    pub async fn request_screenshots(
        &self,
        code: &str,
        teacher_email: &str,
    ) -> AppResult<Timestamp> {
        let (row, mut state) = self.load_owned(code, teacher_email).await?;
        let now = Utc::now();
        state.begin_screenshot_round(now);
        self.save_state(&row, &state).await?;

        tracing::info!(code = %row.code, "Screenshots requested");
        Ok(now)
    }

    pub async fn get_screenshots(
        &self,
        code: &str,
        teacher_email: &str,
    ) -> AppResult<Vec<Screenshot>> {
        let (_, state) = self.load_owned(code, teacher_email).await?;
        Ok(state.screenshots)
    }

    pub async fn clear_screenshots(&self, code: &str, teacher_email: &str) -> AppResult<()> {
        let (row, mut state) = self.load_owned(code, teacher_email).await?;
        state.clear_screenshots();
        self.save_state(&row, &state).await
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use classdash_core::session_code::is_valid_code;
    use classdash_core::widget::Widget;
    use classdash_db::store::MemoryRowStore;
    use serde_json::json;

    use super::*;
    use crate::error::AppError;

    const TEACHER: &str = "teacher@school.org";

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(MemoryRowStore::new()))
    }

    fn classroom() -> DashboardConfig {
        DashboardConfig {
            widgets: vec![
                Widget::new("w1", true, json!({"count": 0})),
                Widget::new("notes", false, json!({"text": "hi"})),
            ],
            bg: Some("#123".into()),
        }
    }

    #[tokio::test]
    async fn create_returns_valid_code_and_seeds_state() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();
        assert!(is_valid_code(&code));

        let joined = sessions.join_session(&code.to_lowercase()).await.unwrap();
        assert_eq!(joined.teacher_email, TEACHER);
        assert_eq!(joined.state.widgets.len(), 2);
        assert_eq!(joined.state.bg, "#123");
        assert_eq!(joined.state.student_count, 0);
    }

    #[tokio::test]
    async fn second_create_ends_the_first() {
        let sessions = manager();
        let first = sessions.create_session(TEACHER, classroom()).await.unwrap();
        let second = sessions.create_session(TEACHER, classroom()).await.unwrap();

        let active = sessions.get_active_session(TEACHER).await.unwrap().unwrap();
        assert_eq!(active.code, second);
        if first != second {
            assert_matches!(
                sessions.get_session_data(&first).await,
                Err(AppError::Core(CoreError::SessionEnded { .. }))
            );
        }
    }

    #[tokio::test]
    async fn update_preserves_interactive_student_data() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();
        sessions
            .update_widget_state(&code, "w1", json!({"count": 3}))
            .await
            .unwrap();

        let push = DashboardConfig {
            widgets: vec![
                Widget::new("w1", true, json!({"count": 0})),
                Widget::new("notes", false, json!({"text": "bye"})),
            ],
            bg: None,
        };
        sessions.update_session(&code, TEACHER, push).await.unwrap();

        let state = sessions.get_session_data(&code).await.unwrap();
        assert_eq!(state.widgets[0].data, json!({"count": 3}));
        assert_eq!(state.widgets[1].data, json!({"text": "bye"}));
        assert_eq!(state.bg, "#123");
    }

    #[tokio::test]
    async fn teacher_operations_check_ownership() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();

        assert_matches!(
            sessions.set_paused(&code, "intruder@school.org", true).await,
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );
        assert_matches!(
            sessions.end_session("NOPE22", TEACHER).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        // Owner match ignores case.
        sessions
            .set_paused(&code, "Teacher@School.org", true)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn paused_session_blocks_widget_writes_but_not_votes() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();
        sessions.set_paused(&code, TEACHER, true).await.unwrap();

        assert_matches!(
            sessions.update_widget_state(&code, "w1", json!({"count": 9})).await,
            Err(AppError::Core(CoreError::SessionPaused))
        );
        let state = sessions.get_session_data(&code).await.unwrap();
        assert_eq!(state.widgets[0].data, json!({"count": 0}));
        assert!(state.paused);

        let tally = sessions
            .submit_poll_response(&code, "poll", PollOption::A)
            .await
            .unwrap();
        assert_eq!(tally, PollTally { a: 1, b: 0 });
    }

    #[tokio::test]
    async fn poll_tallies_accumulate() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();

        sessions.submit_poll_response(&code, "w1", PollOption::A).await.unwrap();
        let tally = sessions.submit_poll_response(&code, "w1", PollOption::A).await.unwrap();
        assert_eq!(tally, PollTally { a: 2, b: 0 });
        let tally = sessions.submit_poll_response(&code, "w1", PollOption::B).await.unwrap();
        assert_eq!(tally, PollTally { a: 2, b: 1 });
    }

    #[tokio::test]
    async fn widget_write_respects_interaction_flag() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();

        assert_matches!(
            sessions.update_widget_state(&code, "notes", json!({})).await,
            Err(AppError::Core(CoreError::Forbidden(_)))
        );
        assert_matches!(
            sessions.update_widget_state(&code, "ghost", json!({})).await,
            Err(AppError::Core(CoreError::NotFound { entity: "Widget", .. }))
        );
    }

    #[tokio::test]
    async fn ended_and_unknown_codes_are_distinguished() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();
        sessions.end_session(&code, TEACHER).await.unwrap();

        assert_matches!(
            sessions.get_session_data(&code).await,
            Err(AppError::Core(CoreError::SessionEnded { .. }))
        );
        assert_matches!(
            sessions.get_session_data("ZZZZZZ").await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        assert_matches!(
            sessions.join_session(&code).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        // Ending again no longer finds an active row.
        assert_matches!(
            sessions.end_session(&code, TEACHER).await,
            Err(AppError::Core(CoreError::NotFound { .. }))
        );
        assert!(sessions.get_active_session(TEACHER).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn screenshot_round_trip() {
        let sessions = manager();
        let code = sessions.create_session(TEACHER, classroom()).await.unwrap();

        sessions
            .submit_screenshot(&code, "early@school.org", "img0".into())
            .await
            .unwrap();
        sessions.request_screenshots(&code, TEACHER).await.unwrap();
        assert!(sessions.get_screenshots(&code, TEACHER).await.unwrap().is_empty());

        sessions
            .submit_screenshot(&code, "s@school.org", "img1".into())
            .await
            .unwrap();
        sessions
            .submit_screenshot(&code, "s@school.org", "img2".into())
            .await
            .unwrap();
        let shots = sessions.get_screenshots(&code, TEACHER).await.unwrap();
        assert_eq!(shots.len(), 2);
        assert_eq!(shots[1].data, "img2");

        assert_matches!(
            sessions.get_screenshots(&code, "s@school.org").await,
            Err(AppError::Core(CoreError::Unauthorized(_)))
        );

        sessions.clear_screenshots(&code, TEACHER).await.unwrap();
        assert!(sessions.get_screenshots(&code, TEACHER).await.unwrap().is_empty());
    }
}
