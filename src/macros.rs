/// Builds a [`LogEvent`](crate::LogEvent) stamped with the current time and
/// the caller's source location.
///
/// Attributes follow the message as `"key" => value` pairs, where each value
/// converts into a [`Value`](crate::Value).
///
/// # Examples
///
/// ```
/// use boxlog::{Level, event};
///
/// let event = event!(Level::Warn, "slow request", "path" => "/api/users", "ms" => 812u64);
/// assert_eq!(event.attr_count(), 2);
/// assert!(event.timestamp.is_some());
/// assert_eq!(event.source.map(|source| source.line), Some(line!() - 3));
/// ```
#[macro_export]
macro_rules! event {
    ($level:expr, $message:expr $(, $key:literal => $value:expr)* $(,)?) => {
        $crate::LogEvent::new($level, $message)
            .timestamped_now()
            .with_source($crate::SourceLocation::new(
                ::core::file!(),
                ::core::line!(),
            ))
            $(.with_attr($crate::Attr::new($key, $value)))*
    };
}

/// Builds an event like [`event!`] and sends it to the
/// [default handler](crate::hooks::default_handler).
///
/// Evaluates to `Result<(), HandleError>`; without a default handler the
/// event is discarded.
///
/// # Examples
///
/// ```
/// use boxlog::{Level, log};
///
/// log!(Level::Info, "cache warmed", "entries" => 1024u64).unwrap();
/// ```
#[macro_export]
macro_rules! log {
    ($($args:tt)*) => {
        $crate::hooks::default_handler::log(&$crate::event!($($args)*))
    };
}
