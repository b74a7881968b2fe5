//! Contact list controller: reconciles user intent with the remote phonebook.

use std::{collections::HashSet, sync::Arc};

use shared::domain::{NewPerson, Person};
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::{
    error::ServiceError,
    notification::{Notification, NotificationKind, Notifier},
    service::PersonService,
};

/// Unsaved form input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DraftEntry {
    pub name: String,
    pub number: String,
}

impl DraftEntry {
    pub fn new(name: impl Into<String>, number: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.number.is_empty()
    }
}

/// A pending yes/no decision the caller must answer through
/// [`ContactListController::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    ReplaceNumber { person: Person, number: String },
    Remove { person: Person },
}

impl Confirmation {
    pub fn prompt(&self) -> String {
        match self {
            Self::ReplaceNumber { person, .. } => format!(
                "{} is already added to phonebook, replace the number?",
                person.name
            ),
            Self::Remove { person } => format!("remove {} from phonebook?", person.name),
        }
    }

    pub fn person(&self) -> &Person {
        match self {
            Self::ReplaceNumber { person, .. } | Self::Remove { person } => person,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    Added(Person),
    Updated(Person),
    Removed(Person),
    /// The server no longer knew the person; the local copy was dropped.
    AlreadyRemoved(Person),
    ConfirmationRequired(Confirmation),
    Declined,
    /// The service refused or could not be reached; local state is unchanged.
    Rejected(ServiceError),
}

#[derive(Debug, Default)]
struct ContactListState {
    persons: Vec<Person>,
    draft: DraftEntry,
    filter: String,
}

/// Case-insensitive substring match of `filter` against the person's name.
pub fn matches_filter(person: &Person, filter: &str) -> bool {
    person
        .name
        .to_lowercase()
        .contains(&filter.to_lowercase())
}

/// The list as displayed: everything when `filter` is empty, otherwise the matches.
pub fn filtered_view(persons: &[Person], filter: &str) -> Vec<Person> {
    if filter.is_empty() {
        return persons.to_vec();
    }
    persons
        .iter()
        .filter(|person| matches_filter(person, filter))
        .cloned()
        .collect()
}

fn failure_message(err: &ServiceError) -> String {
    match err {
        ServiceError::Validation { message } => message.clone(),
        other => other.to_string(),
    }
}

fn upsert(persons: &mut Vec<Person>, person: Person) {
    match persons.iter_mut().find(|existing| existing.id == person.id) {
        Some(slot) => *slot = person,
        None => persons.push(person),
    }
}

fn dedupe_by_id(persons: Vec<Person>) -> Vec<Person> {
    let mut seen = HashSet::new();
    persons
        .into_iter()
        .filter(|person| {
            let fresh = seen.insert(person.id.clone());
            if !fresh {
                warn!(person_id = %person.id, "dropping duplicate person id from server list");
            }
            fresh
        })
        .collect()
}

/// Owns the in-memory phonebook, the draft form and the filter, and routes every
/// mutation through the injected [`PersonService`].
///
/// State is only locked around local reads and writes, never across a remote
/// call, so operations may interleave. Each one applies its confirmed result to
/// the list as it is when the call completes.
pub struct ContactListController {
    service: Arc<dyn PersonService>,
    state: Mutex<ContactListState>,
    notifier: Notifier,
}

impl ContactListController {
    pub fn new(service: Arc<dyn PersonService>) -> Self {
        Self::with_notifier(service, Notifier::default())
    }

    pub fn with_notifier(service: Arc<dyn PersonService>, notifier: Notifier) -> Self {
        Self {
            service,
            state: Mutex::new(ContactListState::default()),
            notifier,
        }
    }

    /// Replaces the list with the server's. On failure an error banner is shown
    /// and the error is handed back so the caller can decide whether to go on.
    pub async fn initialize(&self) -> Result<usize, ServiceError> {
        match self.service.fetch_all().await {
            Ok(persons) => {
                let persons = dedupe_by_id(persons);
                let count = persons.len();
                self.state.lock().await.persons = persons;
                info!(count, "phonebook loaded");
                Ok(count)
            }
            Err(err) => {
                error!(error = %err, "failed to load phonebook");
                self.notifier
                    .error(format!("failed to load phonebook: {err}"))
                    .await;
                Err(err)
            }
        }
    }

    /// Adds `draft` as a new person, or asks to replace the number when a person
    /// with exactly that name already exists.
    pub async fn submit_contact(&self, draft: DraftEntry) -> ActionOutcome {
        if let Some(existing) = self.find_by_name(&draft.name).await {
            debug!(person_id = %existing.id, name = %existing.name, "name exists; asking to replace number");
            return self.replace_number(existing, draft.number);
        }

        let request = NewPerson::new(draft.name.clone(), draft.number.clone());
        match self.service.create(request).await {
            Ok(created) => {
                {
                    let mut state = self.state.lock().await;
                    upsert(&mut state.persons, created.clone());
                    state.draft = DraftEntry::default();
                }
                info!(person_id = %created.id, name = %created.name, "person added");
                self.notifier
                    .info(format!("{} added!", created.name))
                    .await;
                ActionOutcome::Added(created)
            }
            Err(err) => {
                warn!(name = %draft.name, error = %err, "create rejected");
                self.notifier.error(failure_message(&err)).await;
                ActionOutcome::Rejected(err)
            }
        }
    }

    /// Submits the draft currently held by the controller.
    pub async fn submit_draft(&self) -> ActionOutcome {
        let draft = self.draft().await;
        self.submit_contact(draft).await
    }

    pub fn replace_number(&self, person: Person, number: impl Into<String>) -> ActionOutcome {
        ActionOutcome::ConfirmationRequired(Confirmation::ReplaceNumber {
            person,
            number: number.into(),
        })
    }

    pub fn delete_contact(&self, person: &Person) -> ActionOutcome {
        ActionOutcome::ConfirmationRequired(Confirmation::Remove {
            person: person.clone(),
        })
    }

    /// Answers a pending confirmation. Declining changes nothing.
    pub async fn resolve(&self, confirmation: Confirmation, accepted: bool) -> ActionOutcome {
        if !accepted {
            debug!(name = %confirmation.person().name, "confirmation declined");
            return ActionOutcome::Declined;
        }

        match confirmation {
            Confirmation::ReplaceNumber { person, number } => {
                self.apply_replace_number(person, number).await
            }
            Confirmation::Remove { person } => self.apply_delete(person).await,
        }
    }

    async fn apply_replace_number(&self, person: Person, number: String) -> ActionOutcome {
        // Once accepted the form is cleared whatever the server answers.
        self.state.lock().await.draft = DraftEntry::default();

        let replacement = person.with_number(number);
        match self.service.update_by_id(&person.id, replacement).await {
            Ok(updated) => {
                {
                    let mut state = self.state.lock().await;
                    if let Some(slot) = state.persons.iter_mut().find(|p| p.id == person.id) {
                        *slot = updated.clone();
                    }
                }
                info!(person_id = %person.id, number = %updated.number, "number replaced");
                self.notifier
                    .info(format!("phone number of {} updated!", person.name))
                    .await;
                ActionOutcome::Updated(updated)
            }
            Err(ServiceError::NotFound { .. }) => self.drop_stale(person).await,
            Err(err) => {
                warn!(person_id = %person.id, error = %err, "update rejected");
                self.notifier.error(failure_message(&err)).await;
                ActionOutcome::Rejected(err)
            }
        }
    }

    async fn apply_delete(&self, person: Person) -> ActionOutcome {
        match self.service.delete_by_id(&person.id).await {
            Ok(()) => {
                self.state
                    .lock()
                    .await
                    .persons
                    .retain(|p| p.id != person.id);
                info!(person_id = %person.id, name = %person.name, "person deleted");
                self.notifier
                    .info(format!("number of {} deleted!", person.name))
                    .await;
                ActionOutcome::Removed(person)
            }
            Err(ServiceError::NotFound { .. }) => self.drop_stale(person).await,
            Err(err) => {
                warn!(person_id = %person.id, error = %err, "delete rejected");
                self.notifier.error(failure_message(&err)).await;
                ActionOutcome::Rejected(err)
            }
        }
    }

    async fn drop_stale(&self, person: Person) -> ActionOutcome {
        self.state
            .lock()
            .await
            .persons
            .retain(|p| p.id != person.id);
        warn!(person_id = %person.id, name = %person.name, "person already removed on server");
        self.notifier
            .error(format!("{} has already been removed", person.name))
            .await;
        ActionOutcome::AlreadyRemoved(person)
    }

    pub async fn notify(&self, message: impl Into<String>, kind: NotificationKind) -> u64 {
        self.notifier
            .notify(Notification {
                message: message.into(),
                kind,
            })
            .await
    }

    pub async fn notification(&self) -> Option<Notification> {
        self.notifier.current().await
    }

    pub async fn set_filter(&self, text: impl Into<String>) {
        self.state.lock().await.filter = text.into();
    }

    pub async fn filter(&self) -> String {
        self.state.lock().await.filter.clone()
    }

    pub async fn filtered_view(&self) -> Vec<Person> {
        let state = self.state.lock().await;
        filtered_view(&state.persons, &state.filter)
    }

    pub async fn persons(&self) -> Vec<Person> {
        self.state.lock().await.persons.clone()
    }

    /// First person whose name equals `name` exactly, in list order.
    pub async fn find_by_name(&self, name: &str) -> Option<Person> {
        self.state
            .lock()
            .await
            .persons
            .iter()
            .find(|person| person.name == name)
            .cloned()
    }

    pub async fn draft(&self) -> DraftEntry {
        self.state.lock().await.draft.clone()
    }

    pub async fn set_draft(&self, draft: DraftEntry) {
        self.state.lock().await.draft = draft;
    }

    pub async fn set_draft_name(&self, name: impl Into<String>) {
        self.state.lock().await.draft.name = name.into();
    }

    pub async fn set_draft_number(&self, number: impl Into<String>) {
        self.state.lock().await.draft.number = number.into();
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
