//! Record builders shared by the collection tests

use shared::Record;

pub fn student(id: &str, name: &str, class_id: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("student_age", 20)
        .with("year_enrolled", 2200)
        .with("graduating_year", 2220)
        .with("class_id", class_id)
}

pub fn class(id: &str, name: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("level", "JC2")
}

pub fn subject(id: &str, name: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("level", "H2")
}

pub fn cca(id: &str, name: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("type", "Sports")
}

pub fn activity(id: &str, name: &str, cca_id: &str) -> Record {
    Record::new()
        .with("id", id)
        .with("name", name)
        .with("start_date", "20230404")
        .with("end_date", "20230405")
        .with("description", "Community service")
        .with("category", "Service")
        .with("role", "Member")
        .with("award", "None")
        .with("hours", 5)
        .with("cca_id", cca_id)
}
