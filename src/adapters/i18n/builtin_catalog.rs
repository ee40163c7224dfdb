//! Built-in texts for English, Ukrainian and Russian.
//!
//! Templates are Telegram HTML. Placeholders are filled by
//! `MessageCatalog::render`; callers escape user-supplied values.

use crate::domain::integration::Locale;
use crate::ports::{MessageCatalog, MessageKey};

#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinMessageCatalog;

impl BuiltinMessageCatalog {
    pub fn new() -> Self {
        Self
    }
}

impl MessageCatalog for BuiltinMessageCatalog {
    fn template(&self, locale: Locale, key: MessageKey) -> &str {
        match locale {
            Locale::En => english(key),
            Locale::Uk => ukrainian(key),
            Locale::Ru => russian(key),
        }
    }
}

fn english(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        ButtonGetStarted => "🚀 Get started",
        ButtonMaybeLater => "Maybe later",
        NotReady => "No problem! Send /start whenever you are ready.",

        PlansTitle => "<b>Choose your plan:</b>",
        PlansNoneAvailable => "No plans are available right now. Please try again later.",
        IntervalMonthly => "monthly",
        IntervalYearly => "yearly",
        IntervalOneTime => "one-time",

        PaymentGenerating => "⏳ Generating your payment link...",
        PaymentTerms => "<b>Almost there!</b>\n\nAccount: {account_info}\n\nAfter payment you will get access to the channel automatically.{unsubscribe_note}",
        UnsubscribeNote => "\n\nYou can cancel your subscription at any time with /status.",
        ButtonCompletePayment => "💳 Complete payment",
        PaymentErrorGenerating => "❌ We could not create a payment link. Please try again later.",
        SomethingWrong => "Something went wrong. Please try again later.",

        StatusActive => "✅ Your subscription is <b>active</b>.",
        StatusExpiring => "⚠️ Your subscription is active until <b>{ends_at}</b> and will not renew.",
        StatusCancelled => "❌ Your subscription was cancelled. It ended on <b>{ends_at}</b>.\n\nSend /start to subscribe again.",
        StatusNone => "You don't have a subscription yet. Send /start to get one.",
        StatusError => "We could not check your subscription right now. Please try again in a few minutes.",
        StatusEndsAtFallback => "an unknown date",
        ButtonOpenChannel => "📢 Open channel",
        ButtonJoinChannel => "👉 Join channel",
        ButtonManageSubscription => "⚙️ Manage subscription",

        CancelConfirmation => "Cancelled. Send /start to begin again.",

        AccessAlreadyMember => "🎉 Payment received! You are already a member of the channel.",
        AccessAdded => "🎉 Payment received! You have been added to the channel.",
        AccessInviteLink => "🎉 Payment received! Use this link to join the channel:\n{link}",
        AccessContactSupport => "🎉 Payment received! We could not create an invite link. Please contact support to get access.",

        CommandStartDescription => "Start and choose a plan",
        CommandStatusDescription => "Check your subscription",
        CommandCancelDescription => "Cancel the current action",
    }
}

fn ukrainian(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        ButtonGetStarted => "🚀 Почати",
        ButtonMaybeLater => "Можливо пізніше",
        NotReady => "Без проблем! Надішліть /start, коли будете готові.",

        PlansTitle => "<b>Оберіть план:</b>",
        PlansNoneAvailable => "Зараз немає доступних планів. Спробуйте пізніше.",
        IntervalMonthly => "щомісяця",
        IntervalYearly => "щороку",
        IntervalOneTime => "одноразово",

        PaymentGenerating => "⏳ Створюємо посилання на оплату...",
        PaymentTerms => "<b>Майже готово!</b>\n\nАкаунт: {account_info}\n\nПісля оплати ви автоматично отримаєте доступ до каналу.{unsubscribe_note}",
        UnsubscribeNote => "\n\nСкасувати підписку можна будь-коли через /status.",
        ButtonCompletePayment => "💳 Оплатити",
        PaymentErrorGenerating => "❌ Не вдалося створити посилання на оплату. Спробуйте пізніше.",
        SomethingWrong => "Щось пішло не так. Спробуйте пізніше.",

        StatusActive => "✅ Ваша підписка <b>активна</b>.",
        StatusExpiring => "⚠️ Ваша підписка активна до <b>{ends_at}</b> і не буде продовжена.",
        StatusCancelled => "❌ Вашу підписку скасовано. Вона завершилась <b>{ends_at}</b>.\n\nНадішліть /start, щоб підписатися знову.",
        StatusNone => "У вас ще немає підписки. Надішліть /start, щоб оформити.",
        StatusError => "Не вдалося перевірити підписку. Спробуйте за кілька хвилин.",
        StatusEndsAtFallback => "невідома дата",
        ButtonOpenChannel => "📢 Відкрити канал",
        ButtonJoinChannel => "👉 Приєднатися до каналу",
        ButtonManageSubscription => "⚙️ Керувати підпискою",

        CancelConfirmation => "Скасовано. Надішліть /start, щоб почати знову.",

        AccessAlreadyMember => "🎉 Оплату отримано! Ви вже учасник каналу.",
        AccessAdded => "🎉 Оплату отримано! Вас додано до каналу.",
        AccessInviteLink => "🎉 Оплату отримано! Приєднуйтесь до каналу за посиланням:\n{link}",
        AccessContactSupport => "🎉 Оплату отримано! Не вдалося створити запрошення. Зверніться до підтримки.",

        CommandStartDescription => "Почати та обрати план",
        CommandStatusDescription => "Перевірити підписку",
        CommandCancelDescription => "Скасувати поточну дію",
    }
}

fn russian(key: MessageKey) -> &'static str {
    use MessageKey::*;
    match key {
        ButtonGetStarted => "🚀 Начать",
        ButtonMaybeLater => "Может быть позже",
        NotReady => "Без проблем! Отправьте /start, когда будете готовы.",

        PlansTitle => "<b>Выберите план:</b>",
        PlansNoneAvailable => "Сейчас нет доступных планов. Попробуйте позже.",
        IntervalMonthly => "ежемесячно",
        IntervalYearly => "ежегодно",
        IntervalOneTime => "единоразово",

        PaymentGenerating => "⏳ Создаём ссылку на оплату...",
        PaymentTerms => "<b>Почти готово!</b>\n\nАккаунт: {account_info}\n\nПосле оплаты вы автоматически получите доступ к каналу.{unsubscribe_note}",
        UnsubscribeNote => "\n\nОтменить подписку можно в любой момент через /status.",
        ButtonCompletePayment => "💳 Оплатить",
        PaymentErrorGenerating => "❌ Не удалось создать ссылку на оплату. Попробуйте позже.",
        SomethingWrong => "Что-то пошло не так. Попробуйте позже.",

        StatusActive => "✅ Ваша подписка <b>активна</b>.",
        StatusExpiring => "⚠️ Ваша подписка активна до <b>{ends_at}</b> и не будет продлена.",
        StatusCancelled => "❌ Ваша подписка отменена. Она закончилась <b>{ends_at}</b>.\n\nОтправьте /start, чтобы подписаться снова.",
        StatusNone => "У вас ещё нет подписки. Отправьте /start, чтобы оформить.",
        StatusError => "Не удалось проверить подписку. Попробуйте через несколько минут.",
        StatusEndsAtFallback => "неизвестная дата",
        ButtonOpenChannel => "📢 Открыть канал",
        ButtonJoinChannel => "👉 Вступить в канал",
        ButtonManageSubscription => "⚙️ Управлять подпиской",

        CancelConfirmation => "Отменено. Отправьте /start, чтобы начать заново.",

        AccessAlreadyMember => "🎉 Оплата получена! Вы уже участник канала.",
        AccessAdded => "🎉 Оплата получена! Вы добавлены в канал.",
        AccessInviteLink => "🎉 Оплата получена! Присоединяйтесь к каналу по ссылке:\n{link}",
        AccessContactSupport => "🎉 Оплата получена! Не удалось создать приглашение. Обратитесь в поддержку.",

        CommandStartDescription => "Начать и выбрать план",
        CommandStatusDescription => "Проверить подписку",
        CommandCancelDescription => "Отменить текущее действие",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PLACEHOLDER_KEYS: [(MessageKey, &str); 4] = [
        (MessageKey::PaymentTerms, "{account_info}"),
        (MessageKey::StatusExpiring, "{ends_at}"),
        (MessageKey::StatusCancelled, "{ends_at}"),
        (MessageKey::AccessInviteLink, "{link}"),
    ];

    #[test]
    fn every_locale_keeps_placeholders() {
        let catalog = BuiltinMessageCatalog::new();
        for locale in Locale::ALL {
            for (key, placeholder) in PLACEHOLDER_KEYS {
                assert!(
                    catalog.template(locale, key).contains(placeholder),
                    "{:?} {:?} lost {}",
                    locale,
                    key,
                    placeholder
                );
            }
        }
    }

    #[test]
    fn interval_words() {
        let catalog = BuiltinMessageCatalog::new();
        assert_eq!(catalog.text(Locale::En, MessageKey::IntervalMonthly), "monthly");
        assert_eq!(catalog.text(Locale::En, MessageKey::IntervalOneTime), "one-time");
        assert_eq!(catalog.text(Locale::Uk, MessageKey::IntervalYearly), "щороку");
    }

    #[test]
    fn render_fills_invite_link() {
        let text = BuiltinMessageCatalog::new().render(
            Locale::En,
            MessageKey::AccessInviteLink,
            &[("link", "https://t.me/+abc")],
        );
        assert!(text.ends_with("https://t.me/+abc"));
    }
}
