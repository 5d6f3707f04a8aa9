use super::fields::RichTextField;
use super::leave::FormDraft;
use crate::components::ui::{
    Button, ButtonSize, ButtonVariant, Card, CardContent, CardHeader, CardTitle, FieldInput,
    Label, Spinner,
};
use crate::content::list;
use crate::models::{ApplyStep, OnlineApply};
use crate::richtext::RichText;
use crate::state::{AppContext, AppState};
use leptos::prelude::*;
use leptos::task::spawn_local;

type ApplyForm = FormDraft<Vec<OnlineApply>>;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
enum StepError {
    #[error("Step {step} of {record} has not been created on the server yet")]
    NotCreated { record: String, step: usize },
    #[error("Step {step} of {record} needs a title")]
    MissingTitle { record: String, step: usize },
}

/// An edited step and where it sits in the page.
#[derive(Debug, Clone, PartialEq)]
struct StepChange {
    record: usize,
    step: usize,
    id: String,
    value: ApplyStep,
}

/// Steps of `current` that differ from `saved`. Steps are only ever edited in place here,
/// so both sides line up by position.
fn changed_steps(
    saved: &[OnlineApply],
    current: &[OnlineApply],
) -> Result<Vec<StepChange>, StepError> {
    let mut changes = Vec::new();
    for (r, (before, after)) in saved.iter().zip(current).enumerate() {
        for (s, (old, new)) in before.steps.iter().zip(&after.steps).enumerate() {
            if old == new {
                continue;
            }
            let Some(id) = new.id.clone() else {
                return Err(StepError::NotCreated {
                    record: after.title.clone(),
                    step: s + 1,
                });
            };
            if new.title.trim().is_empty() {
                return Err(StepError::MissingTitle {
                    record: after.title.clone(),
                    step: s + 1,
                });
            }
            changes.push(StepChange {
                record: r,
                step: s,
                id,
                value: new.clone(),
            });
        }
    }
    Ok(changes)
}

fn save_steps(app: AppState, form: ApplyForm) {
    let Some(sent) = form.begin_save() else {
        return;
    };
    let saved = form.draft.with_untracked(|d| d.saved().clone());
    let changes = match changed_steps(&saved, &sent) {
        Ok(changes) => changes,
        Err(e) => {
            app.error(e.to_string());
            form.save_failed();
            return;
        }
    };
    let api = app.api();

    spawn_local(async move {
        let mut stored = sent.clone();
        for change in &changes {
            match api.update_apply_step(&change.id, &change.value).await {
                Ok(step) => {
                    let slot = stored
                        .get_mut(change.record)
                        .and_then(|r| r.steps.get_mut(change.step));
                    if let Some(slot) = slot {
                        *slot = step;
                    }
                }
                Err(e) => {
                    tracing::warn!(step = %change.id, "step update failed");
                    app.report(&e);
                    form.save_failed();
                    return;
                }
            }
        }
        app.success(format!("{} step(s) saved", changes.len()));
        form.saved(&sent, Some(stored));
    });
}

#[component]
pub fn OnlineApplyPage() -> impl IntoView {
    let app = expect_context::<AppContext>().0;
    let form: ApplyForm = FormDraft::new(vec![], move |form| save_steps(app, form));
    let loading = RwSignal::new(true);

    let api = app.api();
    spawn_local(async move {
        match api.list::<OnlineApply>().await {
            Ok(records) => form.load(records),
            Err(e) => app.report(&e),
        }
        loading.set(false);
    });

    // Record titles and step counts; the page never adds or removes steps.
    let layout = Memo::new(move |_| {
        form.with(|records| {
            records
                .iter()
                .map(|r| (r.title.clone(), r.steps.len()))
                .collect::<Vec<_>>()
        })
    });

    let cards = move || {
        form.revision.track();
        layout
            .get()
            .into_iter()
            .enumerate()
            .map(|(r, (title, count))| {
                let steps = (0..count)
                    .map(|s| step_editor(form, r, s))
                    .collect_view();
                view! {
                    <Card>
                        <CardHeader>
                            <CardTitle>{title}</CardTitle>
                        </CardHeader>
                        <CardContent>{steps}</CardContent>
                    </Card>
                }
            })
            .collect_view()
    };

    view! {
        <div class="mx-auto flex max-w-3xl flex-col gap-4">
            <div class="flex items-center justify-between">
                <h1 class="text-xl font-semibold">"Online Apply"</h1>
                <div class="flex items-center gap-2">
                    <Button
                        variant=ButtonVariant::Ghost
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.is_dirty() || form.saving.get()
                        on:click=move |_| form.revert()
                    >
                        "Discard changes"
                    </Button>
                    <Button
                        size=ButtonSize::Sm
                        attr:disabled=move || !form.is_dirty() || form.saving.get()
                        on:click=move |_| form.save()
                    >
                        "Save"
                    </Button>
                </div>
            </div>
            <Show
                when=move || !loading.get()
                fallback=|| view! { <div class="flex justify-center p-8"><Spinner /></div> }
            >
                {cards}
            </Show>
        </div>
    }
}

/// Runs `f` on one step of one record.
fn edit_step(
    records: &mut [OnlineApply],
    record: usize,
    step: usize,
    f: impl FnOnce(&mut ApplyStep),
) -> Result<(), list::OutOfBounds> {
    list::update(records, record, |r| list::update(&mut r.steps, step, f))?
}

fn step_editor(form: ApplyForm, record: usize, step: usize) -> impl IntoView {
    let read = move |f: fn(&ApplyStep) -> String| {
        form.with(|records| {
            records
                .get(record)
                .and_then(|r| r.steps.get(step))
                .map(f)
                .unwrap_or_default()
        })
    };
    let description = form
        .current()
        .get(record)
        .and_then(|r| r.steps.get(step))
        .map(|s| s.description.clone())
        .unwrap_or_default();
    let initial = RichText::from_stored(&serde_json::Value::String(description));

    view! {
        <div class="flex flex-col gap-2 rounded-lg border p-3">
            <Label>{format!("Step {}", step + 1)}</Label>
            <FieldInput
                value=Signal::derive(move || read(|s| s.title.clone()))
                on_change=Callback::new(move |v: String| {
                    form.edit(|records| edit_step(records, record, step, |s| s.title = v))
                })
            />
            <RichTextField
                initial=initial
                on_change=Callback::new(move |html: RichText| {
                    form.edit(|records| {
                        edit_step(records, record, step, |s| s.description = html.to_stored())
                    })
                })
            />
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn step(id: Option<&str>, title: &str) -> ApplyStep {
        ApplyStep {
            id: id.map(str::to_string),
            title: title.into(),
            description: "<p>Fill the form</p>".into(),
        }
    }

    fn page() -> Vec<OnlineApply> {
        vec![OnlineApply {
            id: Some("a1".into()),
            title: "Admissions".into(),
            steps: vec![step(Some("s1"), "Register"), step(Some("s2"), "Pay fee")],
        }]
    }

    #[test]
    fn test_only_edited_steps_are_sent() {
        let saved = page();
        let mut current = saved.clone();
        edit_step(&mut current, 0, 1, |s| s.title = "Pay the fee".into()).unwrap();

        let changes = changed_steps(&saved, &current).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!((changes[0].record, changes[0].step), (0, 1));
        assert_eq!(changes[0].id, "s2");
        assert_eq!(changes[0].value.title, "Pay the fee");
        assert!(changed_steps(&saved, &saved).unwrap().is_empty());
    }

    #[test]
    fn test_unsendable_steps_are_rejected() {
        let mut saved = page();
        saved[0].steps[0].id = None;
        let mut current = saved.clone();
        current[0].steps[0].title = "Sign up".into();
        assert_eq!(
            changed_steps(&saved, &current),
            Err(StepError::NotCreated { record: "Admissions".into(), step: 1 })
        );

        let saved = page();
        let mut current = saved.clone();
        current[0].steps[1].title = "  ".into();
        let err = changed_steps(&saved, &current).unwrap_err();
        assert_eq!(err.to_string(), "Step 2 of Admissions needs a title");
    }

    #[test]
    fn test_edit_step_out_of_range() {
        let mut records = page();
        assert!(edit_step(&mut records, 0, 2, |s| s.title.clear()).is_err());
        assert!(edit_step(&mut records, 1, 0, |s| s.title.clear()).is_err());
        assert_eq!(records, page());
    }
}
