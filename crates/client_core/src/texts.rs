//! Default user-facing copy.

pub const GREETING: &str =
    "Здравствуйте! Я SalyqAI. Чем могу помочь сегодня по налогам ИП на Упрощенке?";

pub const CHAT_APOLOGY: &str = "Извините, произошла ошибка. Попробуйте еще раз позже.";

pub const CHAT_ERROR_PREFIX: &str = "Ошибка при общении с AI: ";

/// Added after [`CHAT_ERROR_PREFIX`] when the service answered with an error status.
pub const CHAT_SERVER_ERROR_PREFIX: &str = "Ошибка сети или сервера: ";

pub const INTERNAL_ERROR: &str = "Произошла внутренняя ошибка.";

pub const UNEXPECTED_RESPONSE: &str = "Получен неожиданный ответ от сервера.";

pub const INVALID_REVENUE: &str = "Введите корректный доход.";

pub const INVALID_MONTHS_WORKED: &str = "Введите корректное кол-во месяцев (1-6).";

pub const FORM_ERROR_PREFIX: &str = "Ошибка: ";

pub const CALCULATION_SERVER_ERROR_PREFIX: &str = "Ошибка сервера расчета: ";

pub const DISCLAIMER: &str = "ВНИМАНИЕ! Этот инструмент предоставляет расчеты в ознакомительных целях и находится в стадии разработки. Данные могут быть неточными или не учитывать все детали вашей ситуации. Сервис не является официальной налоговой консультацией и не заменяет профессионального бухгалтера. Ответственность за правильность и своевременность уплаты налогов лежит на вас. Всегда сверяйте информацию с официальными источниками (Налоговый Кодекс РК, kgd.gov.kz) и/или консультируйтесь со специалистом.";
