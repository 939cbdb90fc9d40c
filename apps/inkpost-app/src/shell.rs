//! Interactive shell - maps the client's routes onto commands.
//!
//! The listing page is the default view; `create`, `edit <n>`,
//! `register`, and the auth flows are commands over the same view
//! models a graphical front-end would drive. Unknown commands land on
//! the not-found message.

use std::io::Write;

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use inkpost_ui::{
    AuthDialog, AuthMode, BlogCard, BlogList, CreateDialog, LogoutDialog, SessionController,
};

use crate::state::AppState;

type InputLines = Lines<BufReader<Stdin>>;

pub async fn run(state: AppState) -> Result<()> {
    let session = SessionController::start(state.auth.clone()).await;
    let mut identity = session.watch();

    let mut list = BlogList::new(state.blogs.clone());
    list.refresh().await;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    println!("Inkpost - type `help` for commands.");
    render_list(&state, &list, session.email()).await;

    loop {
        // Identity transitions the shell did not await itself (for
        // example an expired session discovered mid-command) still
        // reset the listing to page 1.
        if identity.has_changed().unwrap_or(false) {
            identity.borrow_and_update();
            list.on_auth_change().await;
            render_list(&state, &list, session.email()).await;
        }

        // Mutations queued by dialogs and cards.
        if list.process_notifications().await {
            render_list(&state, &list, session.email()).await;
        }

        print!("> ");
        std::io::stdout().flush()?;
        let Some(line) = lines.next_line().await? else {
            break;
        };

        let mut parts = line.split_whitespace();
        let command = parts.next().unwrap_or("");
        let argument = parts.next();

        match command {
            "" => {}
            "list" | "ls" => {
                list.refresh().await;
                render_list(&state, &list, session.email()).await;
            }
            "next" | "n" => {
                list.next_page().await;
                render_list(&state, &list, session.email()).await;
            }
            "prev" | "p" => {
                list.prev_page().await;
                render_list(&state, &list, session.email()).await;
            }
            "page" => match argument.and_then(|a| a.parse().ok()) {
                Some(n) => {
                    list.go_to_page(n).await;
                    render_list(&state, &list, session.email()).await;
                }
                None => println!("Usage: page <number>"),
            },
            "view" | "v" => view_post(&state, &list, session.email(), argument).await,
            "create" | "c" => create_post(&state, &list, &mut lines).await?,
            "edit" | "e" => edit_post(&state, &list, session.email(), argument, &mut lines).await?,
            "delete" | "d" => {
                delete_post(&state, &list, session.email(), argument, &mut lines).await?;
            }
            "login" => {
                if auth_dialog_flow(&state, &mut lines, AuthMode::Login).await? {
                    identity.changed().await.ok();
                    list.on_auth_change().await;
                    render_list(&state, &list, session.email()).await;
                }
            }
            "register" => {
                if auth_dialog_flow(&state, &mut lines, AuthMode::Register).await? {
                    identity.changed().await.ok();
                    list.on_auth_change().await;
                    render_list(&state, &list, session.email()).await;
                }
            }
            "logout" => {
                if session.user().is_none() {
                    println!("Not signed in.");
                } else if logout_flow(&state, &mut lines).await? {
                    identity.changed().await.ok();
                    list.on_auth_change().await;
                    render_list(&state, &list, session.email()).await;
                }
            }
            "whoami" => match session.email() {
                Some(email) => println!("{email}"),
                None => println!("Not signed in."),
            },
            "export" => export_page(&list)?,
            "help" | "h" => print_help(),
            "quit" | "q" | "exit" => break,
            other => println!("Unknown command: {other}. Type `help` for commands."),
        }
    }

    session.shutdown().await;
    Ok(())
}

async fn render_list(state: &AppState, list: &BlogList, viewer: Option<String>) {
    if let Some(error) = list.error() {
        println!("Error: {error}");
        return;
    }
    if list.shows_empty_state() {
        println!("No blogs found.");
        return;
    }

    println!();
    for (index, blog) in list.rows().iter().enumerate() {
        let mut card = BlogCard::new(
            blog.clone(),
            viewer.clone(),
            state.blogs.clone(),
            state.users.clone(),
            list.refresh_handle(),
        );
        card.resolve_author().await;

        let owner_mark = if card.is_owner() { "  (yours)" } else { "" };
        println!("{}. {}{owner_mark}", index + 1, blog.title);
        println!("   {}", card.excerpt());
        println!(
            "   By {} | {}",
            card.author_name(),
            blog.created_at.format("%b %e, %Y")
        );
        println!();
    }
    println!(
        "Page {} of {}    [prev: p | next: n]",
        list.page(),
        list.total_pages()
    );
}

/// Row lookup shared by `view`, `edit`, and `delete`. Prints the usage
/// or not-found message itself.
fn card_at(
    state: &AppState,
    list: &BlogList,
    viewer: Option<String>,
    argument: Option<&str>,
) -> Option<BlogCard> {
    let Some(index) = argument.and_then(|a| a.parse::<usize>().ok()) else {
        println!("Expected a row number, e.g. `view 1`.");
        return None;
    };

    let Some(blog) = index.checked_sub(1).and_then(|i| list.rows().get(i)) else {
        println!("No post {index} on this page.");
        return None;
    };

    Some(BlogCard::new(
        blog.clone(),
        viewer,
        state.blogs.clone(),
        state.users.clone(),
        list.refresh_handle(),
    ))
}

async fn view_post(state: &AppState, list: &BlogList, viewer: Option<String>, argument: Option<&str>) {
    let Some(mut card) = card_at(state, list, viewer, argument) else {
        return;
    };
    card.resolve_author().await;

    let view = card.open_view();
    let blog = view.blog();

    println!();
    println!("{}", blog.title);
    println!("{}", "=".repeat(blog.title.chars().count().max(8)));
    println!("{}", blog.content);
    println!();
    println!(
        "By {} | created {}",
        card.author_name(),
        blog.created_at.format("%b %e, %Y %H:%M")
    );
    if let Some(updated) = blog.updated_at {
        println!("Last updated {}", updated.format("%b %e, %Y %H:%M"));
    }
}

async fn create_post(state: &AppState, list: &BlogList, lines: &mut InputLines) -> Result<()> {
    let mut dialog = CreateDialog::open(state.auth.as_ref()).await;

    if dialog.needs_sign_in() {
        println!("{}", CreateDialog::sign_in_prompt());
        return Ok(());
    }

    let Some(title) = prompt(lines, "Title: ").await? else {
        return Ok(());
    };
    let Some(content) = prompt(lines, "Content: ").await? else {
        return Ok(());
    };
    dialog.title = title;
    dialog.content = content;

    match dialog.submit(state.blogs.as_ref(), &list.refresh_handle()).await {
        Some(blog) => println!("Created \"{}\".", blog.title),
        None => {
            if let Some(error) = dialog.error() {
                println!("{error}");
            }
        }
    }

    Ok(())
}

async fn edit_post(
    state: &AppState,
    list: &BlogList,
    viewer: Option<String>,
    argument: Option<&str>,
    lines: &mut InputLines,
) -> Result<()> {
    let Some(mut card) = card_at(state, list, viewer, argument) else {
        return Ok(());
    };
    if !card.is_owner() {
        println!("Only the author can edit this post.");
        return Ok(());
    }

    card.begin_edit().await;
    let Some(edit) = card.edit() else {
        return Ok(());
    };
    if !edit.is_available() {
        if let Some(error) = edit.error() {
            println!("{error}");
        }
        return Ok(());
    }

    let current_title = edit.title.clone();
    let Some(title) = prompt(lines, &format!("Title [{current_title}]: ")).await? else {
        return Ok(());
    };
    let Some(content) = prompt(lines, "Content [keep current]: ").await? else {
        return Ok(());
    };

    if let Some(edit) = card.edit_mut() {
        if !title.trim().is_empty() {
            edit.title = title;
        }
        if !content.trim().is_empty() {
            edit.content = content;
        }
    }

    if card.save_edit().await {
        println!("Saved.");
    } else if let Some(error) = card.edit().and_then(|e| e.error()) {
        println!("{error}");
    }

    Ok(())
}

async fn delete_post(
    state: &AppState,
    list: &BlogList,
    viewer: Option<String>,
    argument: Option<&str>,
    lines: &mut InputLines,
) -> Result<()> {
    let Some(mut card) = card_at(state, list, viewer, argument) else {
        return Ok(());
    };
    if !card.is_owner() {
        println!("Only the author can delete this post.");
        return Ok(());
    }

    card.request_delete();
    let answer = prompt(lines, &format!("Delete \"{}\"? [y/N]: ", card.blog().title)).await?;

    match answer.as_deref().map(str::trim) {
        Some("y" | "Y" | "yes") => {
            if card.confirm_delete().await {
                println!("Deleted.");
            } else if let Some(error) = card.delete_confirm().and_then(|c| c.error()) {
                println!("{error}");
            }
        }
        _ => {
            card.cancel_delete();
            println!("Cancelled.");
        }
    }

    Ok(())
}

async fn auth_dialog_flow(
    state: &AppState,
    lines: &mut InputLines,
    mode: AuthMode,
) -> Result<bool> {
    let mut dialog = AuthDialog::new(mode);

    if mode == AuthMode::Register {
        let Some(full_name) = prompt(lines, "Full name: ").await? else {
            return Ok(false);
        };
        dialog.full_name = full_name;
    }
    let Some(email) = prompt(lines, "Email: ").await? else {
        return Ok(false);
    };
    dialog.email = email;
    let Some(password) = prompt(lines, "Password: ").await? else {
        return Ok(false);
    };
    dialog.password = password;
    if mode == AuthMode::Register {
        let Some(confirm) = prompt(lines, "Confirm password: ").await? else {
            return Ok(false);
        };
        dialog.confirm_password = confirm;
    }

    match dialog.submit(state.auth.as_ref(), state.users.as_ref()).await {
        Some(session) => {
            println!(
                "Signed in as {}.",
                session.user.email.as_deref().unwrap_or("unknown")
            );
            Ok(true)
        }
        None => {
            if let Some(error) = dialog.error() {
                println!("{error}");
            }
            Ok(false)
        }
    }
}

async fn logout_flow(state: &AppState, lines: &mut InputLines) -> Result<bool> {
    let answer = prompt(lines, "Are you sure you want to log out? [y/N]: ").await?;
    if !matches!(answer.as_deref().map(str::trim), Some("y" | "Y" | "yes")) {
        println!("Cancelled.");
        return Ok(false);
    }

    let mut dialog = LogoutDialog::new();
    if dialog.confirm(state.auth.as_ref()).await {
        println!("Logged out.");
        Ok(true)
    } else {
        if let Some(error) = dialog.error() {
            println!("{error}");
        }
        Ok(false)
    }
}

/// Current page as JSON, for piping into other tools.
fn export_page(list: &BlogList) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(list.rows())?);
    Ok(())
}

async fn prompt(lines: &mut InputLines, label: &str) -> Result<Option<String>> {
    print!("{label}");
    std::io::stdout().flush()?;
    Ok(lines.next_line().await?)
}

fn print_help() {
    println!("Commands:");
    println!("  list              reload the current page");
    println!("  next / prev       move between pages");
    println!("  page <n>          jump to page n");
    println!("  view <n>          read post n on this page");
    println!("  create            write a new post (requires login)");
    println!("  edit <n>          edit your post n");
    println!("  delete <n>        delete your post n (asks to confirm)");
    println!("  login / register  sign in or create an account");
    println!("  logout            end the session (asks to confirm)");
    println!("  whoami            show the signed-in email");
    println!("  export            print the current page as JSON");
    println!("  quit              leave the shell");
}
