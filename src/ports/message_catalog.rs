//! MessageCatalog port - localized bot texts.
//!
//! Templates use `{name}` placeholders filled by [`MessageCatalog::render`].

use crate::domain::integration::Locale;

/// Every text the bots send.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKey {
    // Offer
    ButtonGetStarted,
    ButtonMaybeLater,
    NotReady,

    // Plans
    PlansTitle,
    PlansNoneAvailable,
    IntervalMonthly,
    IntervalYearly,
    IntervalOneTime,

    // Payment
    PaymentGenerating,
    /// `{account_info}`, `{unsubscribe_note}`
    PaymentTerms,
    UnsubscribeNote,
    ButtonCompletePayment,
    PaymentErrorGenerating,
    SomethingWrong,

    // Status
    StatusActive,
    /// `{ends_at}`
    StatusExpiring,
    /// `{ends_at}`
    StatusCancelled,
    StatusNone,
    StatusError,
    StatusEndsAtFallback,
    ButtonOpenChannel,
    ButtonJoinChannel,
    ButtonManageSubscription,

    CancelConfirmation,

    // Access
    AccessAlreadyMember,
    AccessAdded,
    /// `{link}`
    AccessInviteLink,
    AccessContactSupport,

    // Command menu
    CommandStartDescription,
    CommandStatusDescription,
    CommandCancelDescription,
}

pub trait MessageCatalog: Send + Sync {
    /// Raw template for the key.
    fn template(&self, locale: Locale, key: MessageKey) -> &str;

    /// Template without placeholders.
    fn text(&self, locale: Locale, key: MessageKey) -> String {
        self.template(locale, key).to_string()
    }

    /// Template with `{name}` placeholders replaced.
    fn render(&self, locale: Locale, key: MessageKey, args: &[(&str, &str)]) -> String {
        args.iter().fold(
            self.template(locale, key).to_string(),
            |text, (name, value)| text.replace(&format!("{{{}}}", name), value),
        )
    }
}
