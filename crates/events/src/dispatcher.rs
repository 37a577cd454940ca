//! Notification dispatch.
//!
//! [`NotificationDispatcher`] owns the configured delivery channels and
//! moves `notifications` rows through `pending -> sent | failed`. Booking
//! confirmations, reminders, retries and back-office resends all go
//! through [`NotificationDispatcher::send_notification`].

use std::sync::Arc;

use orta_core::appointment::{METHOD_EMAIL, METHOD_WHATSAPP};
use orta_core::channels::{CHANNEL_EMAIL, CHANNEL_INTERNAL, CHANNEL_PUSH, CHANNEL_WHATSAPP};
use orta_core::messages::{
    self, AppointmentSummary, RenderedMessage, TEMPLATE_APPOINTMENT_CONFIRMATION,
};
use orta_core::reminders;
use orta_core::types::{DbId, Timestamp};
use orta_db::models::appointment::Appointment;
use orta_db::models::notification::{CreateNotification, Notification};
use orta_db::models::reminder::{CreateReminder, DueReminder};
use orta_db::repositories::{
    AppointmentRepo, EmailTemplateRepo, NotificationRepo, ReminderRepo,
};
use orta_db::DbPool;

use crate::bus::{EventBus, ShopEvent, EVENT_NOTIFICATION_FAILED};
use crate::delivery::email::{EmailConfig, EmailDelivery};
use crate::delivery::whatsapp::{WhatsAppConfig, WhatsAppDelivery};
use crate::delivery::{DeliveryChannel, OutboundMessage};

/// Error recorded when a notification targets a channel that is not set up.
pub const ERR_CHANNEL_NOT_CONFIGURED: &str = "channel not configured";

/// Batch size for one retry pass.
const RETRY_BATCH_SIZE: i64 = 100;

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    #[error("Notification {0} not found")]
    NotFound(DbId),

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Routes notifications to their delivery channel and records the outcome.
pub struct NotificationDispatcher {
    pool: DbPool,
    email: Option<Arc<dyn DeliveryChannel>>,
    whatsapp: Option<Arc<dyn DeliveryChannel>>,
    bus: Arc<EventBus>,
}

impl NotificationDispatcher {
    /// A dispatcher with no external channels; email and WhatsApp
    /// notifications fail as not configured until channels are attached.
    pub fn new(pool: DbPool, bus: Arc<EventBus>) -> Self {
        Self {
            pool,
            email: None,
            whatsapp: None,
            bus,
        }
    }

    /// Build a dispatcher with whatever channels the environment configures.
    pub fn from_env(pool: DbPool, bus: Arc<EventBus>) -> Self {
        let mut dispatcher = Self::new(pool, bus);

        match EmailConfig::from_env() {
            Some(config) => {
                tracing::info!(smtp_host = %config.smtp_host, "Email delivery enabled");
                dispatcher = dispatcher.with_email(Arc::new(EmailDelivery::new(config)));
            }
            None => tracing::warn!("SMTP_HOST not set, email delivery disabled"),
        }

        match WhatsAppConfig::from_env().map(WhatsAppDelivery::new) {
            Some(Ok(delivery)) => {
                tracing::info!("WhatsApp delivery enabled");
                dispatcher = dispatcher.with_whatsapp(Arc::new(delivery));
            }
            Some(Err(e)) => tracing::error!(error = %e, "Failed to build WhatsApp client"),
            None => tracing::warn!("WhatsApp provider not configured, delivery disabled"),
        }

        dispatcher
    }

    pub fn with_email(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.email = Some(channel);
        self
    }

    pub fn with_whatsapp(mut self, channel: Arc<dyn DeliveryChannel>) -> Self {
        self.whatsapp = Some(channel);
        self
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    // -----------------------------------------------------------------------
    // Core send
    // -----------------------------------------------------------------------

    /// Deliver a stored notification and record the outcome.
    ///
    /// Returns `Ok(true)` when the notification ended up sent. Delivery
    /// failures are recorded on the row and reported as `Ok(false)`.
    pub async fn send_notification(&self, id: DbId) -> Result<bool, DispatchError> {
        let notification = NotificationRepo::find_by_id(&self.pool, id)
            .await?
            .ok_or(DispatchError::NotFound(id))?;
        self.deliver(&notification).await
    }

    async fn deliver(&self, notification: &Notification) -> Result<bool, DispatchError> {
        let channel = match notification.notification_type.as_str() {
            CHANNEL_EMAIL => self.email.as_ref(),
            CHANNEL_WHATSAPP => self.whatsapp.as_ref(),
            CHANNEL_INTERNAL | CHANNEL_PUSH => {
                NotificationRepo::mark_sent(&self.pool, notification.id, None).await?;
                return Ok(true);
            }
            _ => None,
        };

        let Some(channel) = channel else {
            self.record_failure(notification, ERR_CHANNEL_NOT_CONFIGURED)
                .await?;
            return Ok(false);
        };

        let message = OutboundMessage {
            recipient: notification.recipient.clone(),
            subject: notification.title.clone(),
            body: notification.message.clone(),
            html: notification
                .email_data
                .get("html")
                .and_then(|v| v.as_str())
                .map(str::to_string),
        };

        match channel.send(&message).await {
            Ok(message_id) => {
                let provider_data = message_id.map(|id| {
                    serde_json::json!({ "message_id": id, "provider": channel.name() })
                });
                NotificationRepo::mark_sent(&self.pool, notification.id, provider_data.as_ref())
                    .await?;
                tracing::info!(
                    notification_id = notification.id,
                    channel = channel.name(),
                    "Notification sent"
                );
                Ok(true)
            }
            Err(e) => {
                self.record_failure(notification, &e.to_string()).await?;
                Ok(false)
            }
        }
    }

    async fn record_failure(
        &self,
        notification: &Notification,
        error: &str,
    ) -> Result<(), DispatchError> {
        NotificationRepo::mark_failed(&self.pool, notification.id, error).await?;
        tracing::warn!(
            notification_id = notification.id,
            notification_type = %notification.notification_type,
            error,
            "Notification delivery failed"
        );

        let mut event = ShopEvent::new(EVENT_NOTIFICATION_FAILED)
            .with_notification(notification.id)
            .with_payload(serde_json::json!({
                "notification_type": notification.notification_type,
                "error": error,
            }));
        if let Some(appointment_id) = notification.appointment_id {
            event = event.with_appointment(appointment_id);
        }
        self.bus.publish(event);
        Ok(())
    }

    /// Retry failed notifications that still have attempts left.
    ///
    /// Returns the number that were sent successfully.
    pub async fn retry_failed(&self) -> Result<usize, DispatchError> {
        let retryable = NotificationRepo::list_retryable(&self.pool, RETRY_BATCH_SIZE).await?;
        let mut sent = 0;
        for notification in &retryable {
            if self.deliver(notification).await? {
                sent += 1;
            }
        }
        if !retryable.is_empty() {
            tracing::info!(attempted = retryable.len(), sent, "Retried failed notifications");
        }
        Ok(sent)
    }

    // -----------------------------------------------------------------------
    // Appointments
    // -----------------------------------------------------------------------

    /// Record and send the booking confirmation on the customer's chosen channel.
    ///
    /// Returns whether the confirmation was delivered. A delivered
    /// confirmation flags the appointment as auto-confirmed.
    pub async fn send_appointment_confirmation(
        &self,
        appointment: &Appointment,
    ) -> Result<bool, DispatchError> {
        let summary = summary_of(appointment);
        let (notification_type, recipient, rendered) =
            match appointment.confirmation_method.as_str() {
                METHOD_EMAIL => (
                    CHANNEL_EMAIL,
                    appointment.email.as_deref(),
                    messages::confirmation_email(&summary),
                ),
                METHOD_WHATSAPP => (
                    CHANNEL_WHATSAPP,
                    appointment.phone.as_deref(),
                    messages::confirmation_whatsapp(&summary),
                ),
                other => {
                    tracing::warn!(
                        appointment_id = appointment.id,
                        method = other,
                        "Unknown confirmation method"
                    );
                    return Ok(false);
                }
            };

        let Some(recipient) = recipient else {
            tracing::warn!(
                appointment_id = appointment.id,
                "Appointment has no contact for its confirmation method"
            );
            return Ok(false);
        };

        let (rendered, email_data) = if notification_type == CHANNEL_EMAIL {
            self.with_stored_template(&summary, rendered).await?
        } else {
            (rendered, None)
        };

        let notification = self
            .record(appointment.id, notification_type, recipient, rendered, email_data)
            .await?;
        let sent = self.deliver(&notification).await?;
        if sent {
            AppointmentRepo::mark_auto_confirmed(&self.pool, appointment.id).await?;
        }
        Ok(sent)
    }

    /// Store the planned reminders for an appointment, skipping duplicates.
    ///
    /// Returns the number of reminders inserted.
    pub async fn schedule_reminders(
        &self,
        appointment: &Appointment,
        now: Timestamp,
    ) -> Result<usize, DispatchError> {
        let at = reminders::appointment_instant(appointment.date, appointment.time);
        let planned = reminders::planned_reminders(
            at,
            now,
            appointment.email.is_some(),
            appointment.phone.is_some(),
        );

        let mut inserted = 0;
        for reminder in planned {
            let created = ReminderRepo::create_if_absent(
                &self.pool,
                &CreateReminder {
                    appointment_id: appointment.id,
                    reminder_type: reminder.reminder_type.to_string(),
                    hours_before: reminder.hours_before,
                    scheduled_time: reminder.scheduled_time,
                },
            )
            .await?;
            if created.is_some() {
                inserted += 1;
            }
        }
        tracing::debug!(appointment_id = appointment.id, inserted, "Reminders scheduled");
        Ok(inserted)
    }

    /// Replace unsent reminders after the appointment moved.
    pub async fn reschedule_reminders(
        &self,
        appointment: &Appointment,
        now: Timestamp,
    ) -> Result<usize, DispatchError> {
        let removed = ReminderRepo::delete_unsent_for_appointment(&self.pool, appointment.id).await?;
        tracing::debug!(appointment_id = appointment.id, removed, "Unsent reminders removed");
        self.schedule_reminders(appointment, now).await
    }

    /// Turn a due reminder into a notification and send it.
    ///
    /// The reminder itself is not marked sent here; the sweep does that.
    pub async fn send_reminder(&self, reminder: &DueReminder) -> Result<bool, DispatchError> {
        let summary = AppointmentSummary {
            name: &reminder.name,
            date: reminder.date,
            time: reminder.time,
            phone: reminder.phone.as_deref(),
            comment: None,
        };
        let (recipient, rendered) = match reminder.reminder_type.as_str() {
            CHANNEL_EMAIL => (
                reminder.email.as_deref(),
                messages::reminder_email(&summary, reminder.hours_before),
            ),
            CHANNEL_WHATSAPP => (
                reminder.phone.as_deref(),
                messages::reminder_whatsapp(&summary),
            ),
            _ => (None, messages::reminder_whatsapp(&summary)),
        };

        let Some(recipient) = recipient else {
            tracing::warn!(
                reminder_id = reminder.id,
                reminder_type = %reminder.reminder_type,
                "Reminder has no recipient"
            );
            return Ok(false);
        };

        let notification = self
            .record(
                reminder.appointment_id,
                &reminder.reminder_type,
                recipient,
                rendered,
                None,
            )
            .await?;
        self.deliver(&notification).await
    }

    /// Swap in the active confirmation template, if the shop has one.
    ///
    /// The template's HTML travels in `email_data.html`; an empty text part
    /// keeps the built-in body.
    async fn with_stored_template(
        &self,
        summary: &AppointmentSummary<'_>,
        fallback: RenderedMessage,
    ) -> Result<(RenderedMessage, Option<serde_json::Value>), DispatchError> {
        let Some(template) =
            EmailTemplateRepo::find_active_by_name(&self.pool, TEMPLATE_APPOINTMENT_CONFIRMATION)
                .await?
        else {
            return Ok((fallback, None));
        };

        let body = if template.text_content.trim().is_empty() {
            fallback.body
        } else {
            messages::render_template(&template.text_content, summary)
        };
        let rendered = RenderedMessage {
            title: messages::render_template(&template.subject, summary),
            body,
        };
        let email_data = serde_json::json!({
            "template_name": template.name,
            "html": messages::render_template(&template.html_content, summary),
        });
        Ok((rendered, Some(email_data)))
    }

    async fn record(
        &self,
        appointment_id: DbId,
        notification_type: &str,
        recipient: &str,
        rendered: RenderedMessage,
        email_data: Option<serde_json::Value>,
    ) -> Result<Notification, DispatchError> {
        let input = CreateNotification {
            appointment_id: Some(appointment_id),
            recipient: recipient.to_string(),
            title: rendered.title,
            message: rendered.body,
            notification_type: notification_type.to_string(),
            email_data,
            ..Default::default()
        };
        Ok(NotificationRepo::create(&self.pool, &input).await?)
    }
}

fn summary_of(appointment: &Appointment) -> AppointmentSummary<'_> {
    AppointmentSummary {
        name: &appointment.name,
        date: appointment.date,
        time: appointment.time,
        phone: appointment.phone.as_deref(),
        comment: appointment.comment.as_deref(),
    }
}
