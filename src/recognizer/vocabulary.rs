//! Clinical vocabulary boost list
//!
//! Domain phrases attached to the recognition config to bias the backend
//! toward clinical and mental-health terminology across the configured
//! languages. Kept as a static data asset so it can grow without touching
//! pipeline code.

const ENGLISH_TERMS: &[&str] = &[
    // Mental status / psychiatry
    "anxiety",
    "depression",
    "insomnia",
    "panic attack",
    "mood swings",
    "irritability",
    "suicidal ideation",
    "self harm",
    "hallucinations",
    "delusions",
    "paranoia",
    "obsessive thoughts",
    "compulsions",
    "flashbacks",
    "nightmares",
    "dissociation",
    "mania",
    "hypomania",
    "psychosis",
    "catatonia",
    "agitation",
    "restlessness",
    "poor concentration",
    "memory loss",
    "appetite loss",
    "weight gain",
    "weight loss",
    "fatigue",
    "low energy",
    "hopelessness",
    "worthlessness",
    "guilt",
    "anhedonia",
    "social withdrawal",
    "palpitations",
    "breathlessness",
    "dizziness",
    "tremors",
    "headache",
    "chest tightness",
    // Diagnoses
    "major depressive disorder",
    "generalized anxiety disorder",
    "bipolar disorder",
    "schizophrenia",
    "obsessive compulsive disorder",
    "post traumatic stress disorder",
    "adjustment disorder",
    "panic disorder",
    "social anxiety",
    "attention deficit",
    "substance use disorder",
    "alcohol dependence",
    "tobacco dependence",
    // Medication & treatment
    "sertraline",
    "fluoxetine",
    "escitalopram",
    "paroxetine",
    "venlafaxine",
    "desvenlafaxine",
    "mirtazapine",
    "bupropion",
    "amitriptyline",
    "clonazepam",
    "lorazepam",
    "alprazolam",
    "diazepam",
    "zolpidem",
    "olanzapine",
    "risperidone",
    "quetiapine",
    "aripiprazole",
    "haloperidol",
    "lithium",
    "sodium valproate",
    "divalproex",
    "lamotrigine",
    "carbamazepine",
    "propranolol",
    "milligrams",
    "once daily",
    "twice daily",
    "at bedtime",
    "as needed",
    "tapering",
    "dose increase",
    "dose reduction",
    "side effects",
    "drowsiness",
    "dry mouth",
    "nausea",
    "weight change",
    "sexual dysfunction",
    "withdrawal symptoms",
    "cognitive behavioral therapy",
    "psychotherapy",
    "counselling",
    "relaxation exercises",
    "sleep hygiene",
    "follow up",
];

// Hindi: Devanagari plus common romanized forms heard in code-mixed speech.
const HINDI_TERMS: &[&str] = &[
    "चिंता",
    "घबराहट",
    "उदासी",
    "अवसाद",
    "नींद नहीं आती",
    "नींद की समस्या",
    "सिरदर्द",
    "थकान",
    "कमजोरी",
    "भूख नहीं लगती",
    "मन नहीं लगता",
    "डर लगता है",
    "गुस्सा आता है",
    "आत्महत्या",
    "दवाई",
    "दवा का असर",
    "चक्कर आना",
    "धड़कन",
    "बेचैनी",
    "तनाव",
    "याददाश्त",
    "नशा",
    "शराब",
    "नींद की गोली",
    "ghabrahat",
    "udaasi",
    "neend nahi aati",
    "sir dard",
    "thakaan",
    "kamzori",
    "bhookh nahi lagti",
    "bechaini",
    "chakkar",
    "dhadkan",
    "dawai",
    "gussa",
    "tanav",
    "sharab",
];

// Marathi: Devanagari plus romanized forms.
const MARATHI_TERMS: &[&str] = &[
    "काळजी",
    "चिंता वाटते",
    "उदास वाटते",
    "झोप येत नाही",
    "झोपेची समस्या",
    "डोके दुखते",
    "थकवा",
    "अशक्तपणा",
    "भूक लागत नाही",
    "भीती वाटते",
    "राग येतो",
    "छातीत धडधड",
    "गरगरल्यासारखे",
    "औषध",
    "औषधाचा त्रास",
    "ताण",
    "विसरायला होते",
    "व्यसन",
    "दारू",
    "jhop yet nahi",
    "dok dukhte",
    "thakva",
    "bhook lagat nahi",
    "bhiti vatate",
    "aushadh",
    "taan",
];

/// Flatten the per-language tables into the boost phrase list sent with the
/// recognition config.
pub fn clinical_boost_phrases() -> Vec<String> {
    ENGLISH_TERMS
        .iter()
        .chain(HINDI_TERMS.iter())
        .chain(MARATHI_TERMS.iter())
        .map(|s| s.to_string())
        .collect()
}
