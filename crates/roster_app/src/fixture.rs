use roster_core::{TaskError, User, UserDetails};
use roster_engine::{CancellationToken, DataSource};

const PEOPLE: [(u64, &str, &str); 6] = [
    (1, "Ada Lovelace", "Analytical Engines"),
    (2, "Grace Hopper", "US Navy"),
    (3, "Alan Turing", "Bletchley Park"),
    (4, "Margaret Hamilton", "MIT Instrumentation Lab"),
    (5, "Dennis Ritchie", "Bell Labs"),
    (6, "Barbara Liskov", "MIT"),
];

/// Static in-memory user directory.
pub struct Directory {
    users: Vec<User>,
}

impl Directory {
    pub fn sample() -> Self {
        let users = PEOPLE
            .iter()
            .map(|&(id, name, company)| User {
                id,
                name: name.to_string(),
                company: company.to_string(),
                photo: format!("https://avatars.example.com/{id}.png"),
            })
            .collect();
        Self { users }
    }
}

impl DataSource<User> for Directory {
    type Details = UserDetails;

    fn fetch_all(&self, _cancel: &CancellationToken) -> Result<Vec<User>, TaskError> {
        Ok(self.users.clone())
    }

    fn details(&self, user: &User, cancel: &CancellationToken) -> Result<UserDetails, TaskError> {
        if cancel.is_cancelled() {
            return Err(TaskError::Cancelled);
        }
        Ok(UserDetails {
            user: user.clone(),
            details: format!(
                "{} works at {}. Profile photo: {}",
                user.name, user.company, user.photo
            ),
        })
    }
}
