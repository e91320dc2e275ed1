use crate::assessment::*;
use crate::error::{AssessmentError, Result};
use crate::program::{ProgramCatalog, ProgramId};
use crate::session::store::SessionStore;
use crate::session::views::*;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

/// Configuration for the assessment service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub rules: AssessmentRules,
    /// Defaults that per-session overrides are merged onto
    pub session_defaults: SessionConfig,
    /// Fixed shuffle seed, for reproducible pools
    pub shuffle_seed: Option<u64>,
}

type SessionHandle = Arc<Mutex<AssessmentSession>>;

/// A live session plus its owner, readable without taking the session lock
#[derive(Clone)]
struct SessionSlot {
    student_id: StudentId,
    handle: SessionHandle,
}

impl SessionSlot {
    fn new(session: AssessmentSession) -> Self {
        Self {
            student_id: session.owner.student_id.clone(),
            handle: Arc::new(Mutex::new(session)),
        }
    }
}

/// Owns every session and exposes the session lifecycle.
///
/// Each session sits behind its own async mutex, so the whole
/// record/progress/detect/evaluate/persist pipeline runs as one unit per
/// request while different sessions proceed in parallel. Mutations are applied
/// to a copy, persisted, and only then swapped in.
pub struct AssessmentService {
    engine: AssessmentEngine,
    catalog: Arc<dyn ProgramCatalog>,
    store: Arc<dyn SessionStore>,
    config: ServiceConfig,
    sessions: DashMap<SessionId, SessionSlot>,
    active: DashMap<(StudentId, ProgramId), SessionId>,
}

impl AssessmentService {
    pub fn new(
        config: ServiceConfig,
        catalog: Arc<dyn ProgramCatalog>,
        store: Arc<dyn SessionStore>,
    ) -> Result<Self> {
        config.rules.validate()?;
        config.rules.resolve_config(&config.session_defaults, None)?;

        Ok(Self {
            engine: AssessmentEngine::new(config.rules.clone()),
            catalog,
            store,
            config,
            sessions: DashMap::new(),
            active: DashMap::new(),
        })
    }

    /// Replace the answer evaluator used for scoring
    pub fn with_evaluator(mut self, evaluator: Arc<dyn AnswerEvaluator>) -> Self {
        self.engine = AssessmentEngine::with_evaluator(self.config.rules.clone(), evaluator);
        self
    }

    /// Rehydrate every stored session so in-progress ones stay resumable
    pub async fn restore(&self) -> Result<usize> {
        let stored = self.store.load_all().await?;
        let count = stored.len();

        for session in stored {
            if session.is_in_progress() {
                let key = (session.owner.student_id.clone(), session.program_id.clone());
                self.active.insert(key, session.id);
            }
            self.sessions.insert(session.id, SessionSlot::new(session));
        }

        info!("Restored {} sessions ({} in progress)", count, self.active.len());
        Ok(count)
    }

    pub fn engine(&self) -> &AssessmentEngine {
        &self.engine
    }

    pub async fn create_session(&self, request: CreateSessionRequest) -> Result<CreatedSession> {
        let key = (request.student_id.clone(), request.program_id.clone());
        if let Some(existing) = self.active.get(&key) {
            warn!(
                "Rejected duplicate session for student {} in program {}",
                request.student_id, request.program_id
            );
            return Err(duplicate_session(&request, *existing.value()));
        }

        let program = self
            .catalog
            .get_program(&request.program_id)
            .await?
            .ok_or_else(|| AssessmentError::program_not_found(&request.program_id))?;

        let config = self
            .config
            .rules
            .resolve_config(&self.config.session_defaults, request.config.as_ref())?;

        let owner = SessionOwner {
            student_id: request.student_id.clone(),
            school_id: request.school_id.clone(),
            proctor_id: request.proctor_id.clone(),
        };

        let mut rng = match self.config.shuffle_seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = self
            .engine
            .factory()
            .build(owner, &program, config, Utc::now(), &mut rng)?;
        let session_id = session.id;

        match self.active.entry(key.clone()) {
            Entry::Occupied(existing) => {
                return Err(duplicate_session(&request, *existing.get()));
            }
            Entry::Vacant(slot) => {
                slot.insert(session_id);
            }
        }

        if let Err(e) = self.store.save(&session).await {
            self.active.remove_if(&key, |_, id| *id == session_id);
            error!("Failed to persist new session {}: {:#}", session_id, e);
            return Err(e.into());
        }

        let created = CreatedSession {
            id: session.id,
            subject: session.subject.clone(),
            total_questions: session.question_pool.len(),
            status: session.status,
            start_time: session.start_time,
        };
        self.sessions.insert(session_id, SessionSlot::new(session));

        info!(
            "Created session {} for student {} in program {} ({} questions)",
            session_id, request.student_id, request.program_id, created.total_questions
        );
        Ok(created)
    }

    /// Deliver the question at the current pool position.
    ///
    /// Runs the shared stop evaluation first, so this call can complete the
    /// session even without a new response.
    pub async fn get_current_question(&self, session_id: SessionId) -> Result<CurrentQuestion> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        let now = Utc::now();

        if session.is_in_progress() {
            let mut working = session.clone();
            if self
                .engine
                .evaluate_and_maybe_complete(&mut working, now)
                .is_some()
            {
                self.commit(&mut session, working).await?;
            }
        }

        Ok(CurrentQuestion::from_session(&session, now))
    }

    pub async fn submit_response(
        &self,
        session_id: SessionId,
        request: SubmitResponseRequest,
    ) -> Result<SubmitOutcome> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;

        let submission = ResponseSubmission {
            question_id: request.question_id,
            user_answer: request.user_answer,
            time_spent: request.time_spent,
        };

        let mut working = session.clone();
        let outcome = self
            .engine
            .process_response(&mut working, &submission, Utc::now())
            .inspect_err(|e| debug!("Rejected response for session {}: {}", session_id, e))?;

        self.commit(&mut session, working).await?;
        Ok(SubmitOutcome::new(&session, &outcome))
    }

    pub async fn abandon(&self, session_id: SessionId) -> Result<FinalResults> {
        let handle = self.handle(session_id)?;
        let mut session = handle.lock().await;
        let now = Utc::now();

        let mut working = session.clone();
        self.engine.abandon(&mut working, now)?;
        self.commit(&mut session, working).await?;

        Ok(FinalResults::from_session(&session, now))
    }

    pub async fn get_results(&self, session_id: SessionId) -> Result<SessionResults> {
        let handle = self.handle(session_id)?;
        let session = handle.lock().await;
        Ok(SessionResults::from(&*session))
    }

    /// All sessions of a student, oldest first.
    ///
    /// Only that student's sessions are locked, one at a time.
    pub async fn list_sessions(&self, student_id: &str) -> Vec<SessionSummary> {
        let handles: Vec<SessionHandle> = self
            .sessions
            .iter()
            .filter(|entry| entry.value().student_id == student_id)
            .map(|entry| entry.value().handle.clone())
            .collect();

        let mut summaries = Vec::with_capacity(handles.len());
        for handle in handles {
            let session = handle.lock().await;
            summaries.push(SessionSummary::from(&*session));
        }
        summaries.sort_by_key(|summary| summary.start_time);
        summaries
    }

    /// The in-progress session for a student/program pair, if any
    pub fn active_session(&self, student_id: &str, program_id: &str) -> Option<SessionId> {
        self.active
            .get(&(student_id.to_string(), program_id.to_string()))
            .map(|entry| *entry.value())
    }

    fn handle(&self, session_id: SessionId) -> Result<SessionHandle> {
        self.sessions
            .get(&session_id)
            .map(|entry| entry.value().handle.clone())
            .ok_or_else(|| AssessmentError::session_not_found(session_id))
    }

    /// Persist `working`, then make it the live session
    async fn commit(&self, live: &mut AssessmentSession, working: AssessmentSession) -> Result<()> {
        if let Err(e) = self.store.save(&working).await {
            error!("Failed to persist session {}: {:#}", working.id, e);
            return Err(e.into());
        }

        if working.status.is_terminal() {
            let key = (working.owner.student_id.clone(), working.program_id.clone());
            let id = working.id;
            self.active.remove_if(&key, |_, active_id| *active_id == id);
        }

        *live = working;
        Ok(())
    }
}

fn duplicate_session(request: &CreateSessionRequest, existing: SessionId) -> AssessmentError {
    AssessmentError::Conflict(format!(
        "student {} already has session {} in progress for program {}",
        request.student_id, existing, request.program_id
    ))
}
