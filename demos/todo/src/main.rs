//! A headless todo list driven by a scripted event loop.
//!
//! Run with `RUST_LOG=debug` to watch state replacements, storage writes and
//! timers. The list persists under `TACK_STORAGE_DIR` (default `./.tack`)
//! across runs.

use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tack_core::prelude::*;
use tack_navigation::{RouteMatch, url_builder, with_route_match};
use tack_storage::{LocalStorage, LocalStorageConfig, StorageBackend, remember_stored};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
struct Todo {
    title: String,
    done: bool,
}

impl Todo {
    fn new(title: &str) -> Self {
        Self {
            title: title.to_string(),
            done: false,
        }
    }
}

enum Event {
    Add(&'static str),
    Toggle(usize),
    Rename(usize, &'static str),
    Delete(usize),
    ClearDone,
    Search(&'static str),
    Idle(u64),
}

struct App {
    todos: ArrayState<Todo>,
    mode: Signal<Mode>,
    editing: Signal<Option<usize>>,
    search: Rc<Debounced<String>>,
    links: Vec<String>,
}

fn todo_screen(durable: Rc<dyn StorageBackend>, timers: &Timers) -> App {
    let saved = remember_stored::<Vec<Todo>>(durable, "todos", None);
    let todos = remember_array(saved.get());
    let mode = remember_mode(None);
    let editing = remember_nullable::<usize>(None);
    let search = remember(|| Debounced::new(timers, String::new(), Duration::from_millis(250)));

    // Mirror the list into storage on every replacement, for this mount only.
    {
        let todos = todos.clone();
        let saved = saved.clone();
        disposable_effect((), move || {
            let id = todos.signal().subscribe(move |items| saved.set(Some(items.clone())));
            let signal = todos.signal().clone();
            on_unmount(move || {
                signal.unsubscribe(id);
            })
        });
    }
    {
        let search = search.clone();
        disposable_effect((), move || search.bind(&current_scope().unwrap_or_default()));
    }

    let url = url_builder();
    let links = (0..todos.len()).map(|i| url(&format!("{i}/edit"))).collect();

    App {
        todos,
        mode,
        editing,
        search,
        links,
    }
}

fn apply(app: &App, event: &Event) {
    match *event {
        Event::Add(title) => {
            app.mode.set(Mode::Add);
            app.todos.push(Todo::new(title));
        }
        Event::Toggle(i) => {
            if let Some(mut todo) = app.todos.get(i) {
                todo.done = !todo.done;
                app.todos.update(i, todo);
            }
        }
        Event::Rename(i, title) => {
            app.mode.set(Mode::Edit);
            app.editing.set(Some(i));
            if let Some(mut todo) = app.todos.get(i) {
                todo.title = title.to_string();
                app.todos.update(i, todo);
            }
            app.editing.set(None);
        }
        Event::Delete(i) => app.todos.remove(i),
        Event::ClearDone => app.todos.filter(|t| !t.done),
        Event::Search(q) => app.search.set(q.to_string()),
        Event::Idle(_) => {}
    }
}

fn render(app: &App) {
    let query = app.search.signal().get();
    println!("-- {} mode, filter {:?}", app.mode.get(), query);
    app.todos.with(|items| {
        for (todo, link) in items.iter().zip(&app.links) {
            if !query.is_empty() && !todo.title.contains(query.as_str()) {
                continue;
            }
            let mark = if todo.done { 'x' } else { ' ' };
            println!("   [{mark}] {:<24} {link}", todo.title);
        }
    });
}

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = LocalStorageConfig::from_env();
    log::info!("durable storage at {}", config.path().display());
    let durable: Rc<dyn StorageBackend> = Rc::new(LocalStorage::open(&config));
    let timers = Timers::new();
    let screen = Composition::new();
    let route = RouteMatch::new("/lists/inbox/", "/lists/inbox/");

    let script = [
        Event::Add("buy milk"),
        Event::Add("write release notes"),
        Event::Add("call the plumber"),
        Event::Toggle(0),
        Event::Rename(1, "write changelog"),
        Event::Search("wr"),
        Event::Idle(300),
        Event::ClearDone,
        Event::Delete(5),
        Event::Search(""),
        Event::Idle(300),
    ];

    let pass = || {
        screen.compose(|| {
            with_route_match(route.clone(), || todo_screen(durable.clone(), &timers))
        })
    };

    for event in &script {
        apply(&pass(), event);
        if let Event::Idle(ms) = *event {
            std::thread::sleep(Duration::from_millis(ms));
        }
        timers.run_due();
        render(&pass());
    }

    screen.dispose();
    log::info!("{} timer(s) left pending after teardown", timers.pending());
    log::info!("persisted keys: {:?}", durable.keys()?);
    Ok(())
}
