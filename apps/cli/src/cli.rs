//! # Argument Parsing
//!
//! ```text
//! stockbook inventory
//! stockbook product CAM001
//! stockbook sale [--vendor Ana] CAM001:8 PAN001:1
//! stockbook sale --json '{"cart":[{"code":"CAM001","quantitySold":8}],"vendor":"Ana"}'
//! stockbook history [--limit 50] [--from 2024-03-01] [--to 2024-03-31]
//! stockbook summary [--date 2024-03-07]
//! stockbook alerts
//! ```
//!
//! Parsing only checks shape. Codes, quantities and dates are validated
//! by the backend so every entry point applies the same rules.

use serde::Deserialize;
use stockbook_core::CartItem;

use crate::error::ApiError;

/// Usage text printed by `help`.
pub const USAGE: &str = "\
Usage: stockbook <COMMAND>

Commands:
  inventory                               List every product
  product <CODE>                          Show one product
  sale [--vendor V] <CODE:QTY>...         Sell the listed lines
  sale --json <BODY>                      Sell a JSON cart
  history [--limit N] [--from D] [--to D] Ledger rows, most recent last
  summary [--date D]                      Totals of one day (default: today)
  alerts                                  Products at or below minimum stock
  help                                    Show this message

Dates are YYYY-MM-DD. Settings come from STOCKBOOK_* environment variables.";

/// One parsed invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Inventory,
    Product { code: String },
    Sale(SaleRequest),
    History {
        limit: Option<usize>,
        from: Option<String>,
        to: Option<String>,
    },
    Summary { date: Option<String> },
    Alerts,
    Help,
}

/// Body of a sale request.
///
/// Accepts both `{"cart": [...], "vendor": ...}` and the older
/// `{"carrito": [...], "vendedor": ...}` field names. A missing cart
/// deserializes as empty and is rejected by cart validation.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleRequest {
    #[serde(default, alias = "carrito")]
    pub cart: Vec<CartItem>,

    #[serde(default, alias = "vendedor")]
    pub vendor: Option<String>,
}

impl SaleRequest {
    /// Parses a JSON request body.
    pub fn from_json(body: &str) -> Result<Self, ApiError> {
        serde_json::from_str(body)
            .map_err(|e| ApiError::validation(format!("Invalid sale body: {e}")))
    }
}

/// Parses the arguments after the program name.
pub fn parse_args<I>(args: I) -> Result<Command, ApiError>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let Some(command) = args.next() else {
        return Ok(Command::Help);
    };
    let rest: Vec<String> = args.collect();

    match command.as_str() {
        "inventory" => no_arguments(&command, &rest).map(|_| Command::Inventory),
        "alerts" => no_arguments(&command, &rest).map(|_| Command::Alerts),
        "help" | "--help" | "-h" => Ok(Command::Help),
        "product" => match rest.as_slice() {
            [code] => Ok(Command::Product { code: code.clone() }),
            _ => Err(usage_error("product takes exactly one product code")),
        },
        "sale" => parse_sale(rest),
        "history" => {
            let mut flags = Flags::parse(&command, rest, &["--limit", "--from", "--to"])?;
            let limit = match flags.take("--limit") {
                Some(raw) => Some(raw.parse::<usize>().map_err(|_| {
                    ApiError::validation(format!("--limit must be a non-negative integer, got '{raw}'"))
                })?),
                None => None,
            };
            Ok(Command::History {
                limit,
                from: flags.take("--from"),
                to: flags.take("--to"),
            })
        }
        "summary" => {
            let mut flags = Flags::parse(&command, rest, &["--date"])?;
            Ok(Command::Summary {
                date: flags.take("--date"),
            })
        }
        other => Err(usage_error(&format!("unknown command '{other}'"))),
    }
}

fn parse_sale(rest: Vec<String>) -> Result<Command, ApiError> {
    let mut vendor = None;
    let mut json = None;
    let mut lines = Vec::new();

    let mut args = rest.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--vendor" => vendor = Some(flag_value("--vendor", args.next())?),
            "--json" => json = Some(flag_value("--json", args.next())?),
            _ if arg.starts_with("--") => {
                return Err(usage_error(&format!("unknown option '{arg}' for sale")))
            }
            _ => lines.push(parse_line(&arg)?),
        }
    }

    let request = match json {
        Some(body) => {
            if !lines.is_empty() {
                return Err(usage_error("sale takes either --json or CODE:QTY lines, not both"));
            }
            let mut request = SaleRequest::from_json(&body)?;
            if vendor.is_some() {
                request.vendor = vendor;
            }
            request
        }
        None => SaleRequest { cart: lines, vendor },
    };

    Ok(Command::Sale(request))
}

/// `CAM001:8` → `CartItem { code: "CAM001", quantity_sold: 8 }`.
fn parse_line(arg: &str) -> Result<CartItem, ApiError> {
    let invalid = || ApiError::validation(format!("Invalid cart line '{arg}', expected CODE:QTY"));

    let (code, qty) = arg.rsplit_once(':').ok_or_else(invalid)?;
    let qty = qty.trim().parse::<i64>().map_err(|_| invalid())?;
    Ok(CartItem::new(code, qty))
}

fn flag_value(flag: &str, value: Option<String>) -> Result<String, ApiError> {
    value.ok_or_else(|| usage_error(&format!("{flag} needs a value")))
}

fn no_arguments(command: &str, rest: &[String]) -> Result<(), ApiError> {
    if rest.is_empty() {
        Ok(())
    } else {
        Err(usage_error(&format!("{command} takes no arguments")))
    }
}

fn usage_error(message: &str) -> ApiError {
    ApiError::validation(format!("{message} (run `stockbook help` for usage)"))
}

/// `--name value` pairs of one subcommand.
struct Flags(Vec<(String, String)>);

impl Flags {
    fn parse(command: &str, rest: Vec<String>, allowed: &[&str]) -> Result<Self, ApiError> {
        let mut pairs = Vec::new();
        let mut args = rest.into_iter();
        while let Some(flag) = args.next() {
            if !allowed.contains(&flag.as_str()) {
                return Err(usage_error(&format!("unknown option '{flag}' for {command}")));
            }
            let value = flag_value(&flag, args.next())?;
            pairs.push((flag, value));
        }
        Ok(Flags(pairs))
    }

    /// Last value given for `flag`.
    fn take(&mut self, flag: &str) -> Option<String> {
        let mut found = None;
        self.0.retain(|(name, value)| {
            if name == flag {
                found = Some(value.clone());
                false
            } else {
                true
            }
        });
        found
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCode;

    fn parse(args: &[&str]) -> Result<Command, ApiError> {
        parse_args(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn test_simple_commands() {
        assert_eq!(parse(&["inventory"]).unwrap(), Command::Inventory);
        assert_eq!(parse(&["alerts"]).unwrap(), Command::Alerts);
        assert_eq!(parse(&[]).unwrap(), Command::Help);
        assert_eq!(
            parse(&["product", "CAM001"]).unwrap(),
            Command::Product {
                code: "CAM001".to_string()
            }
        );
    }

    #[test]
    fn test_sale_lines() {
        let command = parse(&["sale", "--vendor", "Ana", "CAM001:8", "PAN001:1"]).unwrap();
        assert_eq!(
            command,
            Command::Sale(SaleRequest {
                cart: vec![CartItem::new("CAM001", 8), CartItem::new("PAN001", 1)],
                vendor: Some("Ana".to_string()),
            })
        );
    }

    #[test]
    fn test_sale_json_accepts_both_field_styles() {
        let english = parse(&[
            "sale",
            "--json",
            r#"{"cart":[{"code":"CAM001","quantitySold":8}],"vendor":"Ana"}"#,
        ])
        .unwrap();
        let spanish = parse(&[
            "sale",
            "--json",
            r#"{"carrito":[{"codigo":"CAM001","cantidad_vendida":8}],"vendedor":"Ana"}"#,
        ])
        .unwrap();
        assert_eq!(english, spanish);

        let Command::Sale(request) = english else {
            panic!("expected a sale");
        };
        assert_eq!(request.cart, vec![CartItem::new("CAM001", 8)]);
    }

    #[test]
    fn test_sale_json_without_cart_is_empty() {
        let command = parse(&["sale", "--json", r#"{"vendedor":"Ana"}"#]).unwrap();
        assert_eq!(
            command,
            Command::Sale(SaleRequest {
                cart: Vec::new(),
                vendor: Some("Ana".to_string()),
            })
        );
    }

    #[test]
    fn test_bad_sale_input() {
        for args in [
            &["sale", "CAM001"][..],
            &["sale", "CAM001:ocho"],
            &["sale", "--json", "{not json"],
            &["sale", "--json", "{}", "CAM001:1"],
            &["sale", "--vendor"],
            &["sale", "--discount", "10"],
        ] {
            let err = parse(args).unwrap_err();
            assert_eq!(err.code, ErrorCode::ValidationError, "{args:?}");
        }
    }

    #[test]
    fn test_report_flags() {
        assert_eq!(
            parse(&["history", "--limit", "5", "--from", "2024-03-01"]).unwrap(),
            Command::History {
                limit: Some(5),
                from: Some("2024-03-01".to_string()),
                to: None,
            }
        );
        assert_eq!(
            parse(&["summary"]).unwrap(),
            Command::Summary { date: None }
        );
        assert_eq!(
            parse(&["summary", "--date", "2024-03-07"]).unwrap(),
            Command::Summary {
                date: Some("2024-03-07".to_string())
            }
        );
    }

    #[test]
    fn test_usage_errors() {
        assert!(parse(&["history", "--limit", "-1"]).is_err());
        assert!(parse(&["history", "--vendor", "Ana"]).is_err());
        assert!(parse(&["inventory", "extra"]).is_err());
        assert!(parse(&["product"]).is_err());
        assert!(parse(&["refund"]).is_err());
    }
}
