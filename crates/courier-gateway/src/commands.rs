//! Built-in bot commands

use courier_telegram::TelegramBot;

const START_REPLY: &str =
    "Hello! Send me a proxy list as a file and I will return the reachable proxies.";

/// Register `/start`, `/help` and `/ping`
pub fn register_builtin_commands(bot: &TelegramBot) {
    bot.register_command("/start", |_, _: &TelegramBot| START_REPLY.to_string());

    bot.register_command("/help", |_, bot: &TelegramBot| {
        let mut reply = String::from("Available commands:\n");
        for name in bot.command_names() {
            reply.push_str(&name);
            reply.push('\n');
        }
        reply.push_str("\nSend a text file with one host:port per line to check proxies.");
        reply
    });

    bot.register_command("/ping", |_, _: &TelegramBot| "pong".to_string());
}

#[cfg(test)]
mod tests {
    use super::*;
    use courier_core::TelegramConfig;

    fn test_bot() -> TelegramBot {
        let bot = TelegramBot::new(&TelegramConfig::with_token("1:test")).unwrap();
        register_builtin_commands(&bot);
        bot
    }

    #[test]
    fn test_builtin_commands_registered() {
        let bot = test_bot();
        assert_eq!(bot.command_names(), vec!["/help", "/ping", "/start"]);
    }

    #[tokio::test]
    async fn test_ping() {
        let bot = test_bot();
        assert_eq!(bot.invoke_command(1, "/ping").await.unwrap(), "pong");
    }

    #[tokio::test]
    async fn test_help_lists_commands() {
        let bot = test_bot();
        bot.register_command("/extra", |_, _: &TelegramBot| String::new());

        let reply = bot.invoke_command(1, "/help").await.unwrap();
        for name in ["/extra", "/help", "/ping", "/start"] {
            assert!(reply.contains(name), "missing {} in {:?}", name, reply);
        }
    }
}
