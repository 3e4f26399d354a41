//! Jobs

use super::common::{copy_field, path_str, project_link, ENVIRONMENT, JOB, PROJECT};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::{Error, Result};
use crate::link::{FieldPath, LinkRule, MissingPolicy};
use crate::value::{attributes_from_raw, AttrValue, AttributeMap, RawAccess, RawResource};
use async_trait::async_trait;

/// Trigger name and the local that can switch it off
const TRIGGERS: [(&str, &str); 4] = [
    ("github_webhook", "deactivate_jobs_pr"),
    ("git_provider_webhook", "deactivate_jobs_pr"),
    ("schedule", "deactivate_jobs_schedule"),
    ("on_merge", "deactivate_jobs_merge"),
];

/// Text of a job completion status code
fn status_text(code: i64) -> Option<&'static str> {
    match code {
        10 => Some("success"),
        20 => Some("error"),
        30 => Some("canceled"),
        _ => None,
    }
}

/// `dbtcloud_job`
#[derive(Debug, Default)]
pub struct JobProjector;

#[async_trait]
impl ResourceProjector for JobProjector {
    fn resource_type(&self) -> &'static str {
        JOB
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT, ENVIRONMENT, JOB]
    }

    async fn fetch(&self, client: &DbtCloudClient, filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.jobs(filter).await
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;

        if let Some(settings) = raw.opt_object("settings")? {
            copy_field(&mut attributes, settings, "threads", "num_threads");
            copy_field(&mut attributes, settings, "target_name", "target_name");
        }
        if let Some(execution) = raw.opt_object("execution")? {
            copy_field(&mut attributes, execution, "timeout_seconds", "timeout_seconds");
        }

        project_schedule(raw, &mut attributes)?;

        let triggers = raw.opt_object("triggers")?;
        let mut trigger_map = AttributeMap::new();
        for (name, local) in TRIGGERS {
            let enabled = match triggers {
                Some(triggers) => triggers.opt_bool(name)?.unwrap_or(false),
                None => false,
            };
            let value = if ctx.parameterize_jobs {
                AttrValue::reference(format!("local.{local} ? false : {enabled}"))
            } else {
                AttrValue::bool(enabled)
            };
            trigger_map.insert(name.to_string(), value);
        }
        attributes.insert("triggers".to_string(), AttrValue::Map(trigger_map));

        let mut projection = Projection::new(self.instance_id(raw)?, AttributeMap::new())
            .link(LinkRule::reference("environment_id", ENVIRONMENT, "environment_id"))
            .link(LinkRule::reference(
                "deferring_environment_id",
                ENVIRONMENT,
                "environment_id",
            ))
            .link(project_link());

        attributes.remove("job_completion_trigger_condition");
        if let Some(trigger) = raw.opt_object("job_completion_trigger_condition")? {
            let condition = trigger.req_object("condition")?;

            let mut statuses = Vec::new();
            for status in condition.req_array("statuses")? {
                let text = status
                    .as_i64()
                    .and_then(status_text)
                    .ok_or_else(|| Error::shape("condition.statuses", "status code", status.to_string()))?;
                statuses.push(AttrValue::string(text));
            }

            let mut block = AttributeMap::new();
            block.insert("job_id".to_string(), AttrValue::int(condition.req_i64("job_id")?));
            block.insert(
                "project_id".to_string(),
                AttrValue::int(condition.req_i64("project_id")?),
            );
            block.insert("statuses".to_string(), AttrValue::List(statuses));
            attributes.insert(
                "job_completion_trigger_condition".to_string(),
                AttrValue::List(vec![AttrValue::Map(block)]),
            );

            projection = projection
                .link(LinkRule::reference_at(
                    FieldPath::nested("job_completion_trigger_condition", "job_id"),
                    JOB,
                    "id",
                    MissingPolicy::KeepLiteral,
                ))
                .link(LinkRule::reference_at(
                    FieldPath::nested("job_completion_trigger_condition", "project_id"),
                    PROJECT,
                    "id",
                    MissingPolicy::KeepLiteral,
                ));
        }

        projection.attributes = attributes;
        Ok(projection)
    }
}

/// Collapse `schedule.date` / `schedule.time` into the flat schedule fields
fn project_schedule(raw: &RawResource, attributes: &mut AttributeMap) -> Result<()> {
    let Some(date_type) = path_str(raw, &["schedule", "date", "type"])? else {
        return Ok(());
    };
    let date = raw.path(&["schedule", "date"]);

    match date_type {
        "custom_cron" | "interval_cron" => {
            attributes.insert("schedule_type".to_string(), AttrValue::string("custom_cron"));
            if let Some(cron) = path_str(raw, &["schedule", "date", "cron"])? {
                attributes.insert("schedule_cron".to_string(), AttrValue::string(cron));
            }
        }
        "days_of_week" | "every_day" => {
            attributes.insert("schedule_type".to_string(), AttrValue::string(date_type));
            if date_type == "days_of_week" {
                if let Some(date) = date {
                    copy_field(attributes, date, "days", "schedule_days");
                }
            }
            if let Some(time) = raw.path(&["schedule", "time"]) {
                match path_str(raw, &["schedule", "time", "type"])? {
                    Some("at_exact_hours") => copy_field(attributes, time, "hours", "schedule_hours"),
                    Some("every_hour") => copy_field(attributes, time, "interval", "schedule_interval"),
                    _ => {}
                }
            }
        }
        other => {
            attributes.insert("schedule_type".to_string(), AttrValue::string(other));
        }
    }
    Ok(())
}
