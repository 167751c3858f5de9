//! Text Rendering of the Screen

use std::fmt::Write;

use auth::models::InputType;
use auth::presentation::view::{BannerAction, ButtonView, Content, FormView, Screen};

pub fn render(screen: &Screen) -> String {
    let mut out = String::new();
    // Writing to a String cannot fail
    let _ = write_screen(&mut out, screen);
    out
}

fn write_screen(out: &mut String, screen: &Screen) -> std::fmt::Result {
    write!(out, "== {} ==", screen.banner.heading)?;
    for action in &screen.banner.actions {
        match action {
            BannerAction::Link { name, href } => write!(out, "  [{name}]({href})")?,
            BannerAction::Account {
                name,
                avatar,
                expanded,
            } => write!(
                out,
                "  [{name}: {} {}]{}",
                avatar.initials,
                avatar.color,
                if *expanded { " v" } else { "" }
            )?,
        }
    }
    writeln!(out)?;
    for item in &screen.banner.menu {
        writeln!(out, "    - {}", item.name)?;
    }
    writeln!(out, "{}", screen.path)?;

    match &screen.content {
        Content::Home { text } => writeln!(out, "{text}")?,
        Content::Form(form) => write_form(out, form)?,
        Content::Empty => {}
    }
    Ok(())
}

fn write_form(out: &mut String, form: &FormView) -> std::fmt::Result {
    writeln!(out, "-- {} ({}) --", form.title, form.name)?;
    if let Some(subheader) = &form.subheader {
        writeln!(out, "{subheader}")?;
    }
    for field in &form.fields {
        let value = match field.input_type {
            InputType::Password => "*".repeat(field.value.chars().count()),
            _ => field.value.clone(),
        };
        write!(out, "{}*: {value}", field.label)?;
        if let Some(toggle) = &field.toggle {
            write!(out, "  {}", button(toggle))?;
        }
        writeln!(out)?;
        if let Some(error) = field.error {
            writeln!(out, "  ! {error}")?;
        }
    }
    if let Some(alert) = form.alert {
        writeln!(out, "! {alert}")?;
    }
    if let Some(notice) = &form.notice {
        writeln!(out, "{notice}")?;
    }
    let buttons: Vec<_> = form.buttons.iter().map(button).collect();
    writeln!(out, "{}", buttons.join(" "))?;
    if let Some(progress) = form.progress {
        writeln!(out, "... {progress}")?;
    }
    Ok(())
}

fn button(view: &ButtonView) -> String {
    if view.enabled {
        format!("[{}]", view.name)
    } else {
        format!("({})", view.name)
    }
}
