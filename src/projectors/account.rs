//! Account-wide resources
//!
//! These are listed for the whole account and are not narrowed by the
//! project filter; links into filtered-out projects or jobs fall back to
//! the missing-target policy of each field.

use super::common::{GROUP, JOB, NOTIFICATION, PROJECT, SERVICE_TOKEN, USER_GROUPS, WEBHOOK};
use super::types::{Projection, ProjectionContext, ResourceProjector};
use crate::api::{DbtCloudClient, ProjectFilter};
use crate::error::Result;
use crate::link::{FieldPath, LinkRule, MissingPolicy};
use crate::value::{attributes_from_raw, display_id, AttrValue, RawAccess, RawResource};
use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

/// Groups every account has, managed by dbt Cloud itself
pub const DEFAULT_GROUPS: [&str; 3] = ["Owner", "Member", "Everyone"];

/// Notification type for external email addresses
const EXTERNAL_EMAIL_NOTIFICATION: i64 = 4;

/// Job lists of a notification
const NOTIFICATION_HOOKS: [&str; 4] = ["on_cancel", "on_failure", "on_success", "on_warning"];

/// `dbtcloud_group`, without the default groups
#[derive(Debug, Default)]
pub struct GroupProjector;

#[async_trait]
impl ResourceProjector for GroupProjector {
    fn resource_type(&self) -> &'static str {
        GROUP
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.groups().await
    }

    fn include(&self, raw: &RawResource) -> Result<bool> {
        let name = raw.opt_str("name")?.unwrap_or_default();
        Ok(!DEFAULT_GROUPS.contains(&name))
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let rule = LinkRule::Reference {
            field: FieldPath::nested("group_permissions", "project_id"),
            target: PROJECT.to_string(),
            attribute: "id".to_string(),
            missing: MissingPolicy::KeepLiteral,
            unless_flag: Some("all_projects".to_string()),
        };
        Ok(Projection::new(self.instance_id(raw)?, attributes_from_raw(raw)?).link(rule))
    }
}

/// `dbtcloud_user_groups`, one per user
#[derive(Debug, Default)]
pub struct UserGroupsProjector;

#[async_trait]
impl ResourceProjector for UserGroupsProjector {
    fn resource_type(&self) -> &'static str {
        USER_GROUPS
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[GROUP]
    }

    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.users().await
    }

    fn project(&self, raw: &RawResource, ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        attributes.insert("user_id".to_string(), AttrValue::int(raw.req_i64("id")?));

        let permissions = raw
            .opt_array("permissions")?
            .map(Vec::as_slice)
            .unwrap_or_default();
        let mut account_permission = permissions.first();
        for permission in permissions {
            let account = permission.get("account_id").and_then(display_id);
            if account.as_deref() == Some(ctx.account_id) {
                account_permission = Some(permission);
                break;
            }
        }

        let mut group_ids = Vec::new();
        if let Some(permission) = account_permission {
            let groups = permission
                .opt_array("groups")?
                .map(Vec::as_slice)
                .unwrap_or_default();
            for group in groups {
                group_ids.push(AttrValue::int(group.req_i64("id")?));
            }
        }
        attributes.insert("group_ids".to_string(), AttrValue::List(group_ids));

        // default groups are never generated, their ids stay literal
        Ok(
            Projection::new(self.instance_id(raw)?, attributes).link(LinkRule::reference_at(
                FieldPath::top("group_ids"),
                GROUP,
                "id",
                MissingPolicy::KeepElement,
            )),
        )
    }
}

/// `dbtcloud_webhook`
#[derive(Debug, Default)]
pub struct WebhookProjector;

#[async_trait]
impl ResourceProjector for WebhookProjector {
    fn resource_type(&self) -> &'static str {
        WEBHOOK
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[JOB]
    }

    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.webhooks().await
    }

    /// An empty `job_ids` means every job, so a webhook whose jobs were all
    /// filtered out is skipped rather than widened
    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        Ok(
            Projection::new(self.instance_id(raw)?, attributes_from_raw(raw)?).link(
                LinkRule::reference_at(
                    FieldPath::top("job_ids"),
                    JOB,
                    "id",
                    MissingPolicy::DropElementOrSkip,
                ),
            ),
        )
    }
}

/// `dbtcloud_notification`
#[derive(Debug, Default)]
pub struct NotificationProjector;

#[async_trait]
impl ResourceProjector for NotificationProjector {
    fn resource_type(&self) -> &'static str {
        NOTIFICATION
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[JOB]
    }

    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        client.notifications().await
    }

    /// External notifications without an address cannot be recreated
    fn include(&self, raw: &RawResource) -> Result<bool> {
        let external = raw.opt_i64("type")? == Some(EXTERNAL_EMAIL_NOTIFICATION);
        if external && raw.opt_str("external_email")?.is_none() {
            debug!("Skipping external notification without an email");
            return Ok(false);
        }
        Ok(true)
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        attributes.remove("state");
        if let Some(kind) = raw.opt_i64("type")? {
            attributes.insert("notification_type".to_string(), AttrValue::int(kind));
        }

        let rules = NOTIFICATION_HOOKS.iter().map(|hook| {
            LinkRule::reference_at(FieldPath::top(*hook), JOB, "id", MissingPolicy::DropElement)
        });
        Ok(Projection::new(self.instance_id(raw)?, attributes).links(rules))
    }
}

/// `dbtcloud_service_token` with its permission sets
#[derive(Debug, Default)]
pub struct ServiceTokenProjector;

#[async_trait]
impl ResourceProjector for ServiceTokenProjector {
    fn resource_type(&self) -> &'static str {
        SERVICE_TOKEN
    }

    fn links_to(&self) -> &'static [&'static str] {
        &[PROJECT]
    }

    /// Permissions come from a separate endpoint and are stored on the record
    /// as `service_token_permissions`
    async fn fetch(&self, client: &DbtCloudClient, _filter: &ProjectFilter) -> Result<Vec<RawResource>> {
        let mut tokens = client.service_tokens().await?;
        for token in &mut tokens {
            let permissions = client.service_token_permissions(token.req_i64("id")?).await?;
            if let Value::Object(fields) = token {
                fields.insert(
                    "service_token_permissions".to_string(),
                    Value::Array(permissions),
                );
            }
        }
        Ok(tokens)
    }

    fn project(&self, raw: &RawResource, _ctx: &mut ProjectionContext<'_>) -> Result<Projection> {
        let mut attributes = attributes_from_raw(raw)?;
        attributes.remove("uid");

        // account-wide permission sets have no project and are kept as they are
        Ok(Projection::new(self.instance_id(raw)?, attributes).link(LinkRule::reference_at(
            FieldPath::nested("service_token_permissions", "project_id"),
            PROJECT,
            "id",
            MissingPolicy::DropEntry,
        )))
    }
}
