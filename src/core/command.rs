//! Command parser for the : command system

use crate::modules::alerts::SeverityFilter;

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    // Filtering and selection
    Search(String),
    Wallet(String),
    Reset,
    Tx(String),
    Close,

    // Alerts
    Dismiss(String),
    ClearAlerts,
    Alerts(SeverityFilter),

    // External services
    Risk(Option<String>),
    Trace {
        address: Option<String>,
        depth: Option<u32>,
    },

    // Navigation
    Overview,
    Metrics,
    Home,
    Dashboard,
    Reload,
    Quit,

    // Unknown command
    Unknown(String),
}

/// Parse a command string (without the leading :)
pub fn parse_command(input: &str) -> Command {
    let input = input.trim();
    let mut parts = input.splitn(2, ' ');
    let cmd = parts.next().unwrap_or("");
    let args = parts
        .next()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    match cmd.to_lowercase().as_str() {
        // An empty argument clears the query
        "search" | "find" | "s" => Command::Search(args.unwrap_or_default()),
        "wallet" | "w" | "select" => match args {
            Some(id) => Command::Wallet(id),
            None => Command::Unknown(input.to_string()),
        },
        "reset" => Command::Reset,
        "tx" | "transaction" => match args {
            Some(id) => Command::Tx(id),
            None => Command::Unknown(input.to_string()),
        },
        "close" => Command::Close,

        "dismiss" | "dis" => match args {
            Some(id) => Command::Dismiss(id),
            None => Command::Unknown(input.to_string()),
        },
        "clear-alerts" | "clear" => Command::ClearAlerts,
        "alerts" => match args.as_deref().map(str::parse::<SeverityFilter>) {
            None => Command::Alerts(SeverityFilter::All),
            Some(Ok(filter)) => Command::Alerts(filter),
            Some(Err(_)) => Command::Unknown(input.to_string()),
        },

        "risk" => Command::Risk(args),
        "trace" | "funds" => {
            let mut words = args.as_deref().unwrap_or("").split_whitespace();
            let first = words.next();
            let second = words.next();
            // `trace 5` means depth only
            match (first, second) {
                (None, _) => Command::Trace {
                    address: None,
                    depth: None,
                },
                (Some(a), None) => match a.parse::<u32>() {
                    Ok(depth) => Command::Trace {
                        address: None,
                        depth: Some(depth),
                    },
                    Err(_) => Command::Trace {
                        address: Some(a.to_string()),
                        depth: None,
                    },
                },
                (Some(a), Some(d)) => match d.parse::<u32>() {
                    Ok(depth) => Command::Trace {
                        address: Some(a.to_string()),
                        depth: Some(depth),
                    },
                    Err(_) => Command::Unknown(input.to_string()),
                },
            }
        }

        "overview" | "ov" => Command::Overview,
        "metrics" | "m" => Command::Metrics,
        "home" => Command::Home,
        "dashboard" | "dash" => Command::Dashboard,
        "reload" | "refresh" => Command::Reload,
        "quit" | "q" | "exit" => Command::Quit,

        _ => Command::Unknown(input.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Severity;

    #[test]
    fn test_parse_selection_commands() {
        assert_eq!(parse_command("search 0x1a"), Command::Search("0x1a".to_string()));
        assert_eq!(parse_command("search"), Command::Search(String::new()));
        assert_eq!(
            parse_command("wallet 0x4d5e6f"),
            Command::Wallet("0x4d5e6f".to_string())
        );
        assert_eq!(parse_command("reset"), Command::Reset);
        assert_eq!(parse_command("tx tx_007"), Command::Tx("tx_007".to_string()));
        assert_eq!(parse_command("close"), Command::Close);
    }

    #[test]
    fn test_parse_alert_commands() {
        assert_eq!(
            parse_command("dismiss alert_2"),
            Command::Dismiss("alert_2".to_string())
        );
        assert_eq!(parse_command("clear-alerts"), Command::ClearAlerts);
        assert_eq!(parse_command("alerts"), Command::Alerts(SeverityFilter::All));
        assert_eq!(
            parse_command("alerts high"),
            Command::Alerts(SeverityFilter::Only(Severity::High))
        );
    }

    #[test]
    fn test_parse_service_commands() {
        assert_eq!(parse_command("risk"), Command::Risk(None));
        assert_eq!(
            parse_command("risk 0x112233"),
            Command::Risk(Some("0x112233".to_string()))
        );
        assert_eq!(
            parse_command("trace 0x112233 4"),
            Command::Trace {
                address: Some("0x112233".to_string()),
                depth: Some(4)
            }
        );
        assert_eq!(
            parse_command("trace 2"),
            Command::Trace {
                address: None,
                depth: Some(2)
            }
        );
    }

    #[test]
    fn test_parse_unknown() {
        assert_eq!(
            parse_command("notacommand"),
            Command::Unknown("notacommand".to_string())
        );
        assert_eq!(parse_command("wallet"), Command::Unknown("wallet".to_string()));
        assert_eq!(
            parse_command("alerts critical"),
            Command::Unknown("alerts critical".to_string())
        );
    }
}
