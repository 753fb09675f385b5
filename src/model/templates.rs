//! Built-in starter diagrams offered in the templates sidebar.

/// A named starter diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Template {
    /// Label in the sidebar.
    pub name: &'static str,
    /// Diagram markup loaded when the template is picked.
    pub code: &'static str,
}

/// Built-in templates. Index 0 seeds a fresh session.
pub const TEMPLATES: &[Template] = &[
    Template {
        name: "Flowchart",
        code: "flowchart TD
    A[Christmas] --> B(Go shopping)
    B --> C{Let me think}
    C --> |One| D[Laptop]
    C --> |Two| E[iPhone]
    C --> |Three| F[fa:fa-car Car]
    C --> |Four| G[Something else]",
    },
    Template {
        name: "Sequence Diagram",
        code: "sequenceDiagram
    participant User
    participant System
    participant Database

    User->>System: Request data
    System->>Database: Query
    Database-->>System: Return results
    System-->>User: Display data",
    },
    Template {
        name: "Class Diagram",
        code: "classDiagram
    class Animal {
        +String name
        +int age
        +makeSound()
    }
    class Dog {
        +String breed
        +bark()
    }
    class Cat {
        +String color
        +meow()
    }
    Animal <|-- Dog
    Animal <|-- Cat",
    },
    Template {
        name: "Gantt Chart",
        code: "gantt
    title Project Schedule
    dateFormat  YYYY-MM-DD
    section Planning
    Define Requirements     :a1, 2023-06-01, 15d
    Design                  :a2, after a1, 20d
    section Development
    Code                    :a3, after a2, 30d
    Test                    :a4, after a3, 15d
    section Deployment
    Deploy                  :a5, after a4, 5d
    Feedback                :a6, after a5, 10d",
    },
    Template {
        name: "Entity Relationship",
        code: "erDiagram
    CUSTOMER ||--o{ ORDER : places
    ORDER ||--|{ LINE-ITEM : contains
    CUSTOMER }|..|{ DELIVERY-ADDRESS : uses",
    },
    Template {
        name: "State Diagram",
        code: "stateDiagram-v2
    [*] --> Still
    Still --> [*]
    Still --> Moving
    Moving --> Still
    Moving --> Crash
    Crash --> [*]",
    },
    Template {
        name: "Pie Chart",
        code: "pie title Product Usage
    \"Chrome\" : 42.7
    \"Firefox\" : 30.2
    \"Edge\" : 15.5
    \"Safari\" : 9.8
    \"Others\" : 1.8",
    },
    Template {
        name: "User Journey",
        code: "journey
    title User Journey for Flow2Chat
    section Discovery
      Find Extension: 5: User
      Read Reviews: 3: User
    section Installation
      Install Extension: 5: User
      Initial Setup: 3: User, System
    section Usage
      Create Diagram: 5: User, System
      View Results: 5: User",
    },
];

/// Look up a template by index.
pub fn get(index: usize) -> Option<&'static Template> {
    TEMPLATES.get(index)
}

/// Templates whose name contains `query`, case-insensitively.
///
/// Returns `(index, template)` pairs so selection can refer back to the
/// unfiltered list. A blank query matches everything.
pub fn search(query: &str) -> Vec<(usize, &'static Template)> {
    let needle = query.trim().to_lowercase();
    TEMPLATES
        .iter()
        .enumerate()
        .filter(|(_, t)| needle.is_empty() || t.name.to_lowercase().contains(&needle))
        .collect()
}
