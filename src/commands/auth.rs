use clap::ArgMatches;
use colored::*;

use crate::cli_context::CliContext;
use crate::error::CivicResult;
use crate::identity;

fn masked(token: &str) -> String {
    let chars: Vec<char> = token.chars().collect();
    if chars.len() <= 12 {
        return "*".repeat(chars.len());
    }
    let head: String = chars[..6].iter().collect();
    let tail: String = chars[chars.len() - 4..].iter().collect();
    format!("{}...{}", head, tail)
}

pub async fn handle_auth(matches: &ArgMatches) -> CivicResult<()> {
    let mut context = CliContext::load()?;

    if let Some(api_url) = matches.get_one::<String>("api-url") {
        context.set_api_url(api_url.clone())?;
        println!("API URL saved: {}", api_url.cyan());
    }

    if let Some(token) = matches.get_one::<String>("token") {
        context.set_access_token(Some(token.clone()))?;
        println!("Access token saved successfully!");
    } else if matches.get_flag("logout") {
        context.set_access_token(None)?;
        println!("Signed out; requests are now anonymous.");
    }

    if let Some(email) = matches.get_one::<String>("email") {
        identity::sign_in(email).await?;
        println!(
            "{} Check {} for a sign-in link, then save the token with `civic auth --token <TOKEN>`.",
            "✅".green(),
            email.bold()
        );
        return Ok(());
    }

    println!("{}: {}", "API URL".bold(), context.config().api_url);
    match context.session().bearer() {
        Some(token) => println!("{}: {}", "Access token".bold(), masked(token)),
        None => println!("{}: {}", "Access token".bold(), "none (anonymous)".dimmed()),
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masked_token() {
        assert_eq!(masked("short"), "*****");
        assert_eq!(masked("abcdefghijklmnop"), "abcdef...mnop");
    }
}
