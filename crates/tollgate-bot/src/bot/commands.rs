use serde_json::json;
use serenity::model::id::GuildId;
use tollgate::{interaction::handler::CompletionResult, prelude::*};

use crate::prelude::*;

const GREETINGS: &[&str] = &["Hello", "Howdy", "Ahoy", "Good morning", "Greetings"];

const FLAVOURS: &[(&str, &str)] = &[
    ("Vanilla", "vanilla"),
    ("Chocolate", "chocolate"),
    ("Mint", "mint"),
    ("Lemon", "lemon"),
];

const BLURPLE: u32 = 0x5865_F2;

pub fn register(reg: &mut Registry, guild: Option<GuildId>) {
    let scope = |info: CommandInfo| match guild {
        Some(id) => info.guild(id),
        None => info,
    };

    reg.define(
        scope(
            CommandInfo::slash("greet", "Say hello to someone")
                .option(
                    CommandOption::new(OptionKind::String, "greeting", "How to say hello")
                        .autocomplete(true),
                )
                .option(CommandOption::new(OptionKind::User, "who", "Who to greet")),
        ),
        greet,
    )
    .define(
        scope(
            CommandInfo::slash("dessert", "Order a scoop of ice cream").option(
                FLAVOURS.iter().fold(
                    CommandOption::new(OptionKind::String, "flavour", "The flavour to order")
                        .required(true),
                    |o, (name, value)| o.choice(Choice::new(*name, *value)),
                ),
            ),
        ),
        dessert,
    )
    .define(scope(CommandInfo::user("High five").dm_permission(false)), high_five)
    .completion("greet", complete_greeting)
    .button("wave", wave)
    .menu("flavour", flavour);
}

fn flavour_menu() -> Result<SelectMenu, ValidationError> {
    Ok(SelectMenu::string(
        "flavour",
        FLAVOURS
            .iter()
            .map(|(label, value)| SelectOption::new(*label, *value)),
    )?
    .placeholder("Pick a flavour")
    .max_values(2))
}

async fn greet(int: Arc<Interaction>, args: Args) -> HandlerResult {
    let greeting = args.str("greeting").unwrap_or("Hello");
    let who = match args.user("who") {
        Some(id) => format!("<@{id}>"),
        None => int
            .invoker()
            .map_or_else(|| "there".into(), |u| u.display_name().to_owned()),
    };

    Ok(Reply::new()
        .content(format!("{greeting}, {who}!"))
        .embed(
            Embed::default()
                .title("Welcome!")
                .description("Wave back, or pick a flavour below.")
                .colour(BLURPLE),
        )
        .row(ActionRow::new([
            Button::new("wave", "Wave back")?.emoji('\u{1f44b}')
        ])?)
        .row(ActionRow::menu(flavour_menu()?))
        .suppress_mentions()
        .build()?)
}

async fn dessert(_: Arc<Interaction>, args: Args) -> HandlerResult {
    let flavour = args.str("flavour").context("Missing flavour")?;
    let (name, _) = FLAVOURS
        .iter()
        .find(|(_, v)| *v == flavour)
        .with_context(|| format!("Unknown flavour {flavour:?}"))?;

    Ok(Reply::plain(format!("One scoop of {name}, coming right up."))
        .ephemeral(true)
        .build()?)
}

async fn high_five(int: Arc<Interaction>, _: Args) -> HandlerResult {
    let target = int
        .command()
        .and_then(|c| c.target_id)
        .context("High five has no target")?;

    Ok(Reply::plain(format!("\u{270b} <@{target}>"))
        .suppress_mentions()
        .build()?)
}

async fn complete_greeting(_: Arc<Interaction>, args: Args) -> CompletionResult {
    let typed = match args.focused().map(|a| &a.value) {
        Some(OptionValue::Focused(s)) => s.as_str(),
        _ => "",
    };

    Ok(Completion::matching(GREETINGS.iter().copied(), typed))
}

async fn wave(_: Arc<Interaction>) -> HandlerResult {
    Ok(json!({
        "type": 4,
        "data": {
            "content": "\u{1f44b}",
            "flags": 64,
        },
    })
    .into())
}

async fn flavour(_: Arc<Interaction>, values: Vec<String>) -> HandlerResult {
    let names: Vec<_> = values
        .iter()
        .filter_map(|v| FLAVOURS.iter().find(|(_, f)| f == v).map(|(n, _)| *n))
        .collect();

    if names.is_empty() {
        return Ok(Response::ephemeral("Nothing selected."));
    }

    Ok(Response::update(Reply::plain(format!(
        "Scooping {}...",
        names.join(" and ")
    ))))
}
