//! Deterministic demo data: users, catalog, stock across three stores.

use super::memory::Tables;
use super::models::*;

const STORES: [(&str, &str); 3] = [
    ("S-TA", "Tel Aviv - Dizengoff"),
    ("S-JLM", "Jerusalem - King George"),
    ("S-HFA", "Haifa - Carmel"),
];

// Per medication, quantities for the stores above, in order.
const STOCK: [[i64; 3]; 5] = [
    [30, 2, 0],
    [12, 30, 5],
    [5, 0, 12],
    [2, 12, 30],
    [0, 5, 2],
];

fn user(name: &str, phone: &str, lang: &str, loyalty: &str) -> User {
    User {
        id: new_id(),
        full_name: name.to_string(),
        phone: phone.to_string(),
        preferred_language: lang.to_string(),
        loyalty_id: Some(loyalty.to_string()),
    }
}

#[allow(clippy::too_many_arguments)]
fn medication(
    name: &str,
    name_he: &str,
    ingredient: &str,
    form: &str,
    strength: &str,
    otc_or_rx: OtcOrRx,
    label_instructions: &str,
    warnings: &str,
) -> Medication {
    Medication {
        id: new_id(),
        name: name.to_string(),
        name_he: name_he.to_string(),
        active_ingredients: vec![ingredient.to_string()],
        form: form.to_string(),
        strength: strength.to_string(),
        manufacturer: "Synthetic Pharma".to_string(),
        otc_or_rx,
        label_instructions: label_instructions.to_string(),
        warnings: warnings.to_string(),
    }
}

pub(crate) fn demo_tables() -> Tables {
    let users = vec![
        user("Rotem Cohen", "+972501000001", "he", "L-1001"),
        user("Noam Levi", "+972501000002", "he", "L-1002"),
        user("Yael Mizrahi", "+972501000003", "he", "L-1003"),
        user("Daniel Katz", "+972501000004", "en", "L-1004"),
        user("Maya Rosen", "+972501000005", "en", "L-1005"),
        user("Amit Shani", "+972501000006", "he", "L-1006"),
        user("Tamar Azulay", "+972501000007", "he", "L-1007"),
        user("Eitan Peretz", "+972501000008", "en", "L-1008"),
        user("Lior Bar", "+972501000009", "en", "L-1009"),
        user("Shira Gold", "+972501000010", "he", "L-1010"),
    ];

    let medications = vec![
        medication(
            "Paracetamol",
            "פרצטמול",
            "acetaminophen",
            "tablet",
            "500 mg",
            OtcOrRx::Otc,
            "Label instructions: Take as directed on the package label. Do not exceed the maximum daily dose stated on the label.",
            "Warnings: Contains acetaminophen. Overdose may cause severe liver damage. Keep out of reach of children.",
        ),
        medication(
            "Ibuprofen",
            "איבופרופן",
            "ibuprofen",
            "tablet",
            "200 mg",
            OtcOrRx::Otc,
            "Label instructions: Take with food or milk if stomach upset occurs. Use the lowest effective dose per label.",
            "Warnings: NSAID. May increase risk of stomach bleeding. Do not use if allergic to NSAIDs.",
        ),
        medication(
            "Amoxicillin",
            "אמוקסיצילין",
            "amoxicillin",
            "capsule",
            "500 mg",
            OtcOrRx::Rx,
            "Label instructions: Use only as prescribed. Complete the full course as prescribed.",
            "Warnings: Antibiotic. Allergic reactions may occur. Seek urgent care for signs of a severe allergy.",
        ),
        medication(
            "Metformin",
            "מטפורמין",
            "metformin",
            "tablet",
            "500 mg",
            OtcOrRx::Rx,
            "Label instructions: Take only as prescribed. Follow the dosing schedule provided by the prescriber/pharmacist.",
            "Warnings: Prescription medication. Follow professional instructions. Contact a healthcare professional with questions.",
        ),
        medication(
            "Omeprazole",
            "אומפרזול",
            "omeprazole",
            "capsule",
            "20 mg",
            OtcOrRx::Otc,
            "Label instructions: Take as directed on the package label. Swallow whole; do not crush or chew.",
            "Warnings: If symptoms persist, consult a healthcare professional. Keep out of reach of children.",
        ),
    ];

    let inventory = medications
        .iter()
        .zip(STOCK.iter())
        .flat_map(|(med, quantities)| {
            STORES
                .iter()
                .zip(quantities.iter())
                .map(|((store_id, store_name), qty)| InventoryItem::new(&med.id, *store_id, *store_name, *qty))
        })
        .collect();

    let tickets = vec![NewTicket {
        kind: TicketKind::CustomerService,
        user_id: Some(users[1].id.clone()),
        medication_id: None,
        store_name: None,
        payload: serde_json::json!({"topic": "hours", "note": "Store hours question"}),
    }
    .into_ticket()];

    Tables {
        users,
        medications,
        inventory,
        tickets,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_data_shape() {
        let tables = demo_tables();
        assert_eq!(tables.users.len(), 10);
        assert_eq!(tables.medications.len(), 5);
        assert_eq!(tables.inventory.len(), 15);
        assert_eq!(tables.tickets.len(), 1);
        assert!(tables.medications.iter().any(|m| m.requires_prescription()));
    }

    #[test]
    fn stock_covers_every_status() {
        let tables = demo_tables();
        assert!(tables.inventory.iter().any(|i| i.quantity == 0));
        assert!(tables.inventory.iter().any(|i| (1..5).contains(&i.quantity)));
        assert!(tables.inventory.iter().any(|i| i.quantity >= 5));
    }
}
