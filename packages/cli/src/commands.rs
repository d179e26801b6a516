use std::path::PathBuf;
use std::sync::Arc;

use admin::config::AdminConfig;
use admin::entity::{
    AssetBacked, AssetFields, AssetRef, Assignment, AssignmentDraft, AssignmentPatch, Badge,
    BadgeDraft, BadgePatch, Chapter, ChapterDraft, ChapterPatch, Course, CourseDraft, CoursePatch,
    Grade, Record, Submission, Trade, TradeDraft, TradePatch,
};
use admin::error::AdminError;
use admin::listing::{self, Column};
use admin::repository::{ApiClient, Repository};
use admin::session::{Session, SessionContext};
use admin::workflow::{
    AlwaysConfirm, Confirm, DeleteOutcome, SaveOrchestrator, Upload, create_record,
    delete_record, grade_submission, submissions_for, sync_badge_checkpoint, update_record,
};
use anyhow::Context as _;
use clap::Args;
use common::storage::{ObjectStore, open_store};
use serde::Serialize;
use tracing::debug;

use crate::cli::{
    AssignmentAction, AssignmentFields, BadgeFields, ChapterAction, CourseAction, CourseFields,
    EntityAction, TradeFields,
};
use crate::confirm::TerminalConfirm;
use crate::render;

/// Everything a command needs: loaded config, the session and an API client bound to it.
pub struct Context {
    config: AdminConfig,
    session: Arc<SessionContext>,
    api: ApiClient,
}

impl Context {
    pub async fn load(config: AdminConfig) -> anyhow::Result<Self> {
        let session = Arc::new(
            SessionContext::load(&config.session.path)
                .await
                .context("Failed to load session")?,
        );
        let api = ApiClient::new(&config.api, Arc::clone(&session))?;
        Ok(Self {
            config,
            session,
            api,
        })
    }

    async fn store(&self) -> anyhow::Result<Arc<dyn ObjectStore>> {
        open_store(&self.config.storage)
            .await
            .context("Failed to open object storage")
    }

    async fn orchestrator<E>(&self) -> anyhow::Result<SaveOrchestrator<E>>
    where
        E: AssetBacked,
        E::Draft: AssetFields,
        E::Patch: AssetFields,
    {
        let records: Arc<dyn Repository<E>> = Arc::new(self.api.repository::<E>());
        Ok(SaveOrchestrator::new(
            records,
            self.store().await?,
            self.config.save.patch_retry(),
        ))
    }

    fn require_session(&self) -> Result<(), AdminError> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            Err(AdminError::Session(
                "Not logged in. Run `lms-admin login --token <TOKEN>` first.".into(),
            ))
        }
    }
}

/// Maps command-line fields onto an entity's create and update payloads.
pub trait FormFields: Args {
    type Entity: AssetBacked + Serialize;

    fn draft(self) -> Result<<Self::Entity as Record>::Draft, AdminError>;
    fn patch(self) -> <Self::Entity as Record>::Patch;
    fn columns() -> Vec<Column<Self::Entity>>;
}

fn required<T>(value: Option<T>, flag: &str) -> Result<T, AdminError> {
    value.ok_or_else(|| AdminError::Validation(format!("--{flag} is required")))
}

impl FormFields for CourseFields {
    type Entity = Course;

    fn draft(self) -> Result<CourseDraft, AdminError> {
        Ok(CourseDraft {
            name: self.name.unwrap_or_default(),
            code: self.code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            image: AssetRef::Pending,
        })
    }

    fn patch(self) -> CoursePatch {
        CoursePatch {
            name: self.name,
            code: self.code,
            description: self.description,
            image: None,
        }
    }

    fn columns() -> Vec<Column<Course>> {
        listing::course_columns()
    }
}

impl FormFields for BadgeFields {
    type Entity = Badge;

    fn draft(self) -> Result<BadgeDraft, AdminError> {
        Ok(BadgeDraft {
            name: self.name.unwrap_or_default(),
            image: AssetRef::Pending,
            badge_type: required(self.badge_type, "type")?,
            course_id: self.course_id.unwrap_or_default(),
            chapter_id: self.chapter_id.unwrap_or_default(),
        })
    }

    fn patch(self) -> BadgePatch {
        BadgePatch {
            name: self.name,
            image: None,
            badge_type: self.badge_type,
            course_id: self.course_id,
            chapter_id: self.chapter_id,
        }
    }

    fn columns() -> Vec<Column<Badge>> {
        listing::badge_columns()
    }
}

impl FormFields for TradeFields {
    type Entity = Trade;

    fn draft(self) -> Result<TradeDraft, AdminError> {
        Ok(TradeDraft {
            title: self.title.unwrap_or_default(),
            image: AssetRef::Pending,
            description: self.description.unwrap_or_default(),
            required_badge_type: required(self.required_badge_type, "required-badge-type")?,
        })
    }

    fn patch(self) -> TradePatch {
        TradePatch {
            title: self.title,
            image: None,
            description: self.description,
            required_badge_type: self.required_badge_type,
        }
    }

    fn columns() -> Vec<Column<Trade>> {
        listing::trade_columns()
    }
}

impl FormFields for AssignmentFields {
    type Entity = Assignment;

    fn draft(self) -> Result<AssignmentDraft, AdminError> {
        Ok(AssignmentDraft {
            chapter_id: self.chapter_id.unwrap_or_default(),
            instruction: self.instruction.unwrap_or_default(),
            file_url: AssetRef::Pending,
        })
    }

    fn patch(self) -> AssignmentPatch {
        AssignmentPatch {
            chapter_id: self.chapter_id,
            instruction: self.instruction,
            file_url: None,
        }
    }

    fn columns() -> Vec<Column<Assignment>> {
        listing::assignment_columns()
    }
}

pub async fn login(ctx: &Context, token: String, username: Option<String>) -> anyhow::Result<()> {
    let token = token.trim().to_string();
    if token.is_empty() {
        return Err(AdminError::Session("Token must not be empty".into()).into());
    }
    ctx.session.set(Session { token, username }).await?;
    render::success("Logged in.");
    Ok(())
}

pub async fn logout(ctx: &Context) -> anyhow::Result<()> {
    ctx.session.clear().await?;
    render::success("Logged out.");
    Ok(())
}

pub async fn chapters(ctx: &Context, action: ChapterAction) -> anyhow::Result<()> {
    ctx.require_session()?;
    let records = ctx.api.repository::<Chapter>();
    match action {
        ChapterAction::List { course, filter } => {
            let rows = match course {
                Some(course_id) => ctx.api.course_chapters(course_id).await?,
                None => records.list().await?,
            };
            let columns = listing::chapter_columns();
            let shown = listing::filter_rows(&rows, filter.as_deref().unwrap_or(""), &columns);
            render::table(&shown, &columns);
        }
        ChapterAction::Get { id } => render::record(&records.get(id).await?)?,
        ChapterAction::Create {
            course_id,
            name,
            description,
        } => {
            let draft = ChapterDraft {
                name,
                description,
                course_id,
            };
            let saved = create_record::<Chapter>(&records, &draft).await?;
            render::success(format!("Created chapter {}.", saved.id));
            render::record(&saved)?;
        }
        ChapterAction::Edit {
            id,
            name,
            description,
        } => {
            let patch = ChapterPatch {
                name,
                description,
                ..Default::default()
            };
            let saved = update_record::<Chapter>(&records, id, &patch).await?;
            render::success(format!("Updated chapter {id}."));
            render::record(&saved)?;
        }
        ChapterAction::Delete { id, yes } => {
            let outcome = delete_record::<Chapter>(&records, id, confirmer(yes)).await?;
            report_delete(outcome, "chapter", id);
        }
    }
    Ok(())
}

pub async fn course(ctx: &Context, action: CourseAction) -> anyhow::Result<()> {
    match action {
        CourseAction::Record(action) => entity(ctx, action).await.map(drop),
        CourseAction::Users { id } => {
            ctx.require_session()?;
            let members = ctx.api.course_members(id).await?;
            render::table(&members.iter().collect::<Vec<_>>(), &listing::member_columns());
            render::success(format!("{} enrolled in course {id}.", members.len()));
            Ok(())
        }
    }
}

pub async fn assignment(ctx: &Context, action: AssignmentAction) -> anyhow::Result<()> {
    match action {
        AssignmentAction::Record(action) => entity(ctx, action).await.map(drop),
        AssignmentAction::Responses { id, filter } => {
            ctx.require_session()?;
            let assignment = ctx.api.repository::<Assignment>().get(id).await?;
            let rows = submissions_for(&ctx.api, &assignment).await?;
            let columns = listing::submission_columns();
            let shown = listing::filter_rows(&rows, filter.as_deref().unwrap_or(""), &columns);
            render::table(&shown, &columns);
            Ok(())
        }
        AssignmentAction::Grade {
            id,
            score,
            feedback,
        } => {
            ctx.require_session()?;
            let grade = Grade {
                assignment_score: score,
                assignment_feedback: feedback,
            };
            grade_submission(&ctx.api.repository::<Submission>(), id, &grade).await?;
            render::success(format!("Graded submission {id}."));
            Ok(())
        }
    }
}

/// Run a list/get/create/edit/delete action. Returns the record when one was saved.
pub async fn entity<F>(ctx: &Context, action: EntityAction<F>) -> anyhow::Result<Option<F::Entity>>
where
    F: FormFields,
    <F::Entity as Record>::Draft: AssetFields,
    <F::Entity as Record>::Patch: AssetFields,
{
    ctx.require_session()?;
    let kind = <F::Entity as Record>::KIND;
    let records = ctx.api.repository::<F::Entity>();

    match action {
        EntityAction::List { filter } => {
            let rows = records.list().await?;
            let columns = F::columns();
            let shown = listing::filter_rows(&rows, filter.as_deref().unwrap_or(""), &columns);
            render::table(&shown, &columns);
            Ok(None)
        }
        EntityAction::Get { id } => {
            render::record(&records.get(id).await?)?;
            Ok(None)
        }
        EntityAction::Create { fields, file } => {
            let draft = fields.draft()?;
            let upload = read_upload(file).await?;
            let saved = ctx.orchestrator::<F::Entity>().await?.create(draft, upload).await?;
            render::success(format!("Created {kind} {}.", saved.id()));
            render::record(&saved)?;
            Ok(Some(saved))
        }
        EntityAction::Edit { id, fields, file } => {
            let current = records.get(id).await?;
            let upload = read_upload(file).await?;
            let saved = ctx
                .orchestrator::<F::Entity>()
                .await?
                .edit(id, current.asset(), fields.patch(), upload)
                .await?;
            render::success(format!("Updated {kind} {id}."));
            render::record(&saved)?;
            Ok(Some(saved))
        }
        EntityAction::Delete { id, yes } => {
            let outcome = ctx
                .orchestrator::<F::Entity>()
                .await?
                .delete_by_id(id, confirmer(yes))
                .await?;
            report_delete(outcome, kind.as_str(), id);
            Ok(None)
        }
    }
}

/// After a badge save, mark its chapter as a checkpoint. Failure is reported but the badge stays saved.
pub async fn after_badge_save(ctx: &Context, badge: &Badge) {
    let chapters = ctx.api.repository::<Chapter>();
    match sync_badge_checkpoint(&chapters, badge).await {
        Ok(()) => debug!(chapter = badge.chapter_id, "Checkpoint synced"),
        Err(e) => render::warning(format!(
            "Badge saved, but chapter {} was not marked as a checkpoint: {}",
            badge.chapter_id,
            e.notice()
        )),
    }
}

fn confirmer(yes: bool) -> &'static dyn Confirm {
    if yes { &AlwaysConfirm } else { &TerminalConfirm }
}

fn report_delete(outcome: DeleteOutcome, kind: &str, id: i32) {
    match outcome {
        DeleteOutcome::Deleted => render::success(format!("Deleted {kind} {id}.")),
        DeleteOutcome::Cancelled => render::warning("Delete cancelled."),
    }
}

async fn read_upload(file: Option<PathBuf>) -> anyhow::Result<Option<Upload>> {
    match file {
        Some(path) => {
            let upload = Upload::from_path(&path)
                .await
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Ok(Some(upload))
        }
        None => Ok(None),
    }
}
