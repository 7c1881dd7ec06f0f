use std::fmt::Display;
use std::io::{self, Write};

use anyhow::{Result, bail};
use colored::Colorize;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;

use crate::{
    cli::RunArgs,
    error::{ErrorSeverity, SessionError},
    models::{FinishedSession, Phase},
    plan::load_plan,
    runtime::{LiveSession, SessionEvent},
    session::{Transition, WorkoutSession},
    storage::{JsonSessionStore, SessionSink},
    types::Settings,
    utils::{format_duration, parse_weight},
};

/// One line of operator input.
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Log { reps: u32, weight: f32 },
    Next,
    Prev,
    Skip,
    Show,
    Done,
    Exit,
    Help,
}

pub fn parse_input(line: &str) -> Result<Input> {
    let mut words = line.split_whitespace();
    let Some(cmd) = words.next() else {
        bail!("empty command");
    };

    let input = match cmd.to_ascii_lowercase().as_str() {
        "log" | "l" => {
            let (Some(reps), Some(weight)) = (words.next(), words.next()) else {
                bail!("usage: log <REPS> <WEIGHT|bw>");
            };
            let reps = reps
                .parse()
                .map_err(|_| anyhow::anyhow!("invalid reps: {}", reps))?;
            Input::Log {
                reps,
                weight: parse_weight(weight)?,
            }
        }
        "next" | "n" => Input::Next,
        "prev" | "p" => Input::Prev,
        "skip" | "s" => Input::Skip,
        "show" | "i" => Input::Show,
        "done" | "d" => Input::Done,
        "exit" | "quit" | "q" => Input::Exit,
        "help" | "?" => Input::Help,
        other => bail!("unknown command `{}` (type `help`)", other),
    };

    if words.next().is_some() {
        bail!("too many arguments for `{}`", cmd);
    }
    Ok(input)
}

/// Where the interactive chatter goes. Under `--json` that is stderr, so stdout
/// carries nothing but the finished-session record.
struct Console<W: Write> {
    out: W,
}

impl<W: Write> Console<W> {
    fn say(&mut self, line: impl Display) {
        let _ = writeln!(self.out, "{line}");
    }

    fn prompt(&mut self) {
        let _ = write!(self.out, "{} ", ">".cyan());
        let _ = self.out.flush();
    }
}

fn chatter(json: bool) -> Box<dyn Write + Send> {
    if json {
        Box::new(io::stderr())
    } else {
        Box::new(io::stdout())
    }
}

pub async fn run(args: RunArgs, settings: &Settings, json: bool) -> Result<()> {
    let plan = load_plan(&args.plan, settings.default_rest_seconds)?;
    let (mut live, mut events) = LiveSession::start(plan);
    let mut con = Console { out: chatter(json) };
    let unit = settings.weight_unit.as_str();

    live.with(|s| {
        con.say(format_args!(
            "{} {} — {} exercises",
            "Session:".cyan().bold(),
            s.plan().name.bold(),
            s.plan().len()
        ));
        print_exercise(&mut con, s, unit);
    })
    .await;
    print_help(&mut con);
    con.prompt();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            Some(event) = events.recv() => match event {
                SessionEvent::RestFinished => {
                    let st = live.state().await;
                    con.say(format_args!(
                        "\n{} rest over — set {} is up",
                        "info:".blue().bold(),
                        st.current_set_number
                    ));
                    con.prompt();
                }
            },

            line = lines.next_line() => {
                let Some(line) = line? else {
                    // stdin closed: abandon rather than leave tick tasks behind
                    if !live.state().await.phase.is_terminal() {
                        live.exit_session().await?;
                    }
                    break;
                };
                if line.trim().is_empty() {
                    con.prompt();
                    continue;
                }

                match parse_input(&line) {
                    Ok(input) => dispatch(&mut live, &mut con, input, unit).await,
                    Err(e) => con.say(format_args!("{} {}", "error:".red().bold(), e)),
                }

                if live.state().await.phase.is_terminal() {
                    break;
                }
                con.prompt();
            }
        }
    }

    match live.state().await.phase {
        Phase::Completed => {
            let record = live
                .with(|s| s.finished_session(settings.one_rm_formula))
                .await;
            let Some(record) = record else {
                bail!("completed session has no summary");
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&record)?);
            } else {
                print_summary(&record, unit);
            }

            if !args.no_save {
                let store = JsonSessionStore::new(&settings.sessions_dir);
                store.persist(&record)?;
                con.say(format_args!(
                    "\n{} session saved (id: {})",
                    "ok:".green().bold(),
                    record.id
                ));
            }
        }
        Phase::Exited => {
            info!("session abandoned, nothing saved");
            con.say(format_args!("{} session exited, nothing saved", "ok:".green().bold()));
        }
        Phase::Active => {}
    }

    Ok(())
}

async fn dispatch<W: Write>(
    live: &mut LiveSession,
    con: &mut Console<W>,
    input: Input,
    unit: &str,
) {
    let res = match input {
        Input::Log { reps, weight } => live.log_set(reps, weight).await,
        Input::Next => live.next_exercise().await,
        Input::Prev => live.previous_exercise().await,
        Input::Skip => live.skip_rest().await,
        Input::Done => live.complete_session().await,
        Input::Exit => live.exit_session().await,
        Input::Show => {
            live.with(|s| print_status(con, s, unit)).await;
            return;
        }
        Input::Help => {
            print_help(con);
            return;
        }
    };

    let ok = "ok:".green().bold();
    match res {
        Ok(Transition::RestStarted { seconds }) => con.say(format_args!(
            "{ok} set logged — rest {seconds}s (`skip` to cut it short)"
        )),
        Ok(Transition::SetLogged) => con.say(format_args!("{ok} set logged")),
        Ok(Transition::ExerciseDone) => {
            live.with(|s| {
                con.say(format_args!(
                    "{ok} `{}` done — `next` to move on",
                    s.current_exercise().name
                ))
            })
            .await
        }
        Ok(Transition::Moved { .. }) => live.with(|s| print_exercise(con, s, unit)).await,
        Ok(Transition::RestSkipped) => con.say(format_args!("{ok} rest skipped")),
        Ok(Transition::Completed(_)) | Ok(Transition::Exited) => {}
        Err(e) => print_rejection(con, &e),
    }
}

fn print_rejection<W: Write>(con: &mut Console<W>, e: &SessionError) {
    let label = match e.severity() {
        ErrorSeverity::Warning => "warning:".yellow().bold(),
        _ => "error:".red().bold(),
    };
    con.say(format_args!("{} {}", label, e.user_message()));
}

fn print_exercise<W: Write>(con: &mut Console<W>, s: &WorkoutSession, unit: &str) {
    let st = s.state();
    let item = s.current_exercise();

    con.say(format_args!(
        "\n{} {} {} ({}) — {} × {} reps, rest {}s",
        format!("[{}/{}]", st.current_exercise_index + 1, s.plan().len()).yellow(),
        item.name.bold(),
        "•".dimmed(),
        item.muscle,
        item.target_sets,
        item.target_reps,
        item.rest_seconds
    ));
    if let Some(notes) = &item.notes {
        con.say(format_args!("  {}", notes.dimmed()));
    }
    for link in &item.media {
        con.say(format_args!("  {}", link.underline()));
    }

    let logged: Vec<_> = s.ledger().sets_for(&item.id).collect();
    for n in 1..=item.target_sets {
        let set_num = format!("{}", n).yellow();
        match logged.get(n as usize - 1) {
            Some(set) => con.say(format_args!(
                "   {} • {} reps @ {}{} {}",
                set_num,
                set.reps,
                set.weight,
                unit,
                "✓".green()
            )),
            None if n == st.current_set_number => con.say(format_args!(
                "   {} • {} reps {}",
                set_num,
                item.target_reps,
                "←".cyan()
            )),
            None => con.say(format_args!(
                "   {} • {}",
                set_num,
                format!("{} reps", item.target_reps).dimmed()
            )),
        }
    }
}

fn print_status<W: Write>(con: &mut Console<W>, s: &WorkoutSession, unit: &str) {
    let st = s.state();
    con.say(format_args!(
        "{} elapsed {} — volume {}{}",
        "Session:".cyan().bold(),
        format_duration(st.elapsed_seconds),
        s.ledger().total_volume(),
        unit
    ));
    if st.rest_active {
        con.say(format_args!("  resting, {}s left", st.rest_remaining_seconds));
    }

    for (i, item) in s.plan().items().iter().enumerate() {
        let marker = if i == st.current_exercise_index { "→" } else { " " };
        let done = s.ledger().sets_logged(&item.id);
        let progress = format!("{}/{}", done, item.target_sets);
        let progress = if s.is_exercise_complete(i) {
            progress.green()
        } else {
            progress.normal()
        };
        con.say(format_args!(
            "  {} {} {} {}",
            marker.cyan(),
            format!("{}", i + 1).yellow(),
            item.name,
            progress
        ));
    }
    print_exercise(con, s, unit);
}

fn print_summary(record: &FinishedSession, unit: &str) {
    println!(
        "\n{} {} — duration {}",
        "Completed:".cyan().bold(),
        record.plan.bold(),
        format_duration(record.summary.duration_seconds)
    );
    println!(
        "  {} exercises, total volume {}{}",
        record.summary.exercise_count, record.summary.total_volume, unit
    );

    println!("\n{}", "Exercises:".cyan().bold());
    for ex in &record.exercises {
        let best = if ex.best_estimated_1rm > 0.0 {
            format!(" — e1RM {:.1}{}", ex.best_estimated_1rm, unit)
        } else {
            String::new()
        };
        println!(
            "• {} {}/{} sets, {}{}{}",
            ex.name.bold(),
            ex.sets_logged,
            ex.target_sets,
            ex.volume,
            unit,
            best.dimmed()
        );
    }
}

fn print_help<W: Write>(con: &mut Console<W>) {
    con.say(format_args!(
        "{} log <reps> <weight|bw> · next · prev · skip · show · done · exit",
        "commands:".dimmed()
    ));
}
