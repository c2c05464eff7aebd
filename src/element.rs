//! Periodic table data needed by hydrogen placement and valence checks.
//!
//! Only the properties this crate consumes are tabulated: element symbol,
//! single-bond covalent radius, the list of allowed valence states and the
//! number of outer-shell electrons.

/// A chemical element, numbered by atomic number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum Element {
    H = 1, He = 2, Li = 3, Be = 4, B = 5, C = 6, N = 7, O = 8, F = 9, Ne = 10, Na = 11,
    Mg = 12, Al = 13, Si = 14, P = 15, S = 16, Cl = 17, Ar = 18, K = 19, Ca = 20,
    Sc = 21, Ti = 22, V = 23, Cr = 24, Mn = 25, Fe = 26, Co = 27, Ni = 28, Cu = 29,
    Zn = 30, Ga = 31, Ge = 32, As = 33, Se = 34, Br = 35, Kr = 36, Rb = 37, Sr = 38,
    Y = 39, Zr = 40, Nb = 41, Mo = 42, Tc = 43, Ru = 44, Rh = 45, Pd = 46, Ag = 47,
    Cd = 48, In = 49, Sn = 50, Sb = 51, Te = 52, I = 53, Xe = 54, Cs = 55, Ba = 56,
    La = 57, Ce = 58, Pr = 59, Nd = 60, Pm = 61, Sm = 62, Eu = 63, Gd = 64, Tb = 65,
    Dy = 66, Ho = 67, Er = 68, Tm = 69, Yb = 70, Lu = 71, Hf = 72, Ta = 73, W = 74,
    Re = 75, Os = 76, Ir = 77, Pt = 78, Au = 79, Hg = 80, Tl = 81, Pb = 82, Bi = 83,
    Po = 84, At = 85, Rn = 86, Fr = 87, Ra = 88, Ac = 89, Th = 90, Pa = 91, U = 92,
    Np = 93, Pu = 94, Am = 95, Cm = 96, Bk = 97, Cf = 98, Es = 99, Fm = 100, Md = 101,
    No = 102, Lr = 103, Rf = 104, Db = 105, Sg = 106, Bh = 107, Hs = 108, Mt = 109,
    Ds = 110, Rg = 111, Cn = 112, Nh = 113, Fl = 114, Mc = 115, Lv = 116, Ts = 117,
    Og = 118,
}

impl Element {
    pub fn from_atomic_num(n: u8) -> Option<Element> {
        ELEMENTS.get(usize::from(n).checked_sub(1)?).copied()
    }

    pub fn from_symbol(s: &str) -> Option<Element> {
        TABLE
            .iter()
            .position(|row| row.0 == s)
            .map(|i| ELEMENTS[i])
    }

    pub fn atomic_num(self) -> u8 {
        self as u8
    }

    pub fn symbol(self) -> &'static str {
        TABLE[self as usize - 1].0
    }

    /// Single-bond covalent radius in angstroms (Cordero 2008), if tabulated.
    pub fn covalent_radius(self) -> Option<f64> {
        let r = TABLE[self as usize - 1].1;
        (r > 0.0).then_some(r)
    }

    /// Allowed valence states, most common first.
    ///
    /// The first entry is the default valence; later entries are the
    /// hypervalent states. Elements without a well-defined list (metals,
    /// noble gases) return an empty slice and are never valence-checked.
    pub fn default_valences(self) -> &'static [u8] {
        match self {
            Element::H => &[1],
            Element::B => &[3],
            Element::C | Element::Si | Element::Ge => &[4],
            Element::N => &[3, 5],
            Element::O => &[2],
            Element::F | Element::Cl | Element::Br | Element::At => &[1],
            Element::P | Element::As => &[3, 5, 7],
            Element::S | Element::Se | Element::Te => &[2, 4, 6],
            Element::I => &[1, 3, 5, 7],
            _ => &[],
        }
    }

    pub fn outer_shell_electrons(self) -> u8 {
        OUTER_ELECTRONS[self as usize]
    }
}

/// Symbol and covalent radius per element; `-1.0` marks a missing radius.
static TABLE: [(&str, f64); 118] = [
    ("H", 0.31),
    ("He", 0.28),
    ("Li", 1.28),
    ("Be", 0.96),
    ("B", 0.84),
    ("C", 0.76),
    ("N", 0.71),
    ("O", 0.66),
    ("F", 0.57),
    ("Ne", 0.58),
    ("Na", 1.66),
    ("Mg", 1.41),
    ("Al", 1.21),
    ("Si", 1.11),
    ("P", 1.07),
    ("S", 1.05),
    ("Cl", 1.02),
    ("Ar", 1.06),
    ("K", 2.03),
    ("Ca", 1.76),
    ("Sc", 1.70),
    ("Ti", 1.60),
    ("V", 1.53),
    ("Cr", 1.39),
    ("Mn", 1.39),
    ("Fe", 1.32),
    ("Co", 1.26),
    ("Ni", 1.24),
    ("Cu", 1.32),
    ("Zn", 1.22),
    ("Ga", 1.22),
    ("Ge", 1.20),
    ("As", 1.19),
    ("Se", 1.20),
    ("Br", 1.20),
    ("Kr", 1.16),
    ("Rb", 2.20),
    ("Sr", 1.95),
    ("Y", 1.90),
    ("Zr", 1.75),
    ("Nb", 1.64),
    ("Mo", 1.54),
    ("Tc", 1.47),
    ("Ru", 1.46),
    ("Rh", 1.42),
    ("Pd", 1.39),
    ("Ag", 1.45),
    ("Cd", 1.44),
    ("In", 1.42),
    ("Sn", 1.39),
    ("Sb", 1.39),
    ("Te", 1.38),
    ("I", 1.39),
    ("Xe", 1.40),
    ("Cs", 2.44),
    ("Ba", 2.15),
    ("La", 2.07),
    ("Ce", 2.04),
    ("Pr", 2.03),
    ("Nd", 2.01),
    ("Pm", 1.99),
    ("Sm", 1.98),
    ("Eu", 1.98),
    ("Gd", 1.96),
    ("Tb", 1.94),
    ("Dy", 1.92),
    ("Ho", 1.92),
    ("Er", 1.89),
    ("Tm", 1.90),
    ("Yb", 1.87),
    ("Lu", 1.87),
    ("Hf", 1.75),
    ("Ta", 1.70),
    ("W", 1.62),
    ("Re", 1.51),
    ("Os", 1.44),
    ("Ir", 1.41),
    ("Pt", 1.36),
    ("Au", 1.36),
    ("Hg", 1.32),
    ("Tl", 1.45),
    ("Pb", 1.46),
    ("Bi", 1.48),
    ("Po", 1.40),
    ("At", 1.50),
    ("Rn", 1.50),
    ("Fr", 2.60),
    ("Ra", 2.21),
    ("Ac", 2.15),
    ("Th", 2.06),
    ("Pa", 2.00),
    ("U", 1.96),
    ("Np", 1.90),
    ("Pu", 1.87),
    ("Am", 1.80),
    ("Cm", 1.69),
    ("Bk", -1.0),
    ("Cf", -1.0),
    ("Es", -1.0),
    ("Fm", -1.0),
    ("Md", -1.0),
    ("No", -1.0),
    ("Lr", -1.0),
    ("Rf", -1.0),
    ("Db", -1.0),
    ("Sg", -1.0),
    ("Bh", -1.0),
    ("Hs", -1.0),
    ("Mt", -1.0),
    ("Ds", -1.0),
    ("Rg", -1.0),
    ("Cn", -1.0),
    ("Nh", -1.0),
    ("Fl", -1.0),
    ("Mc", -1.0),
    ("Lv", -1.0),
    ("Ts", -1.0),
    ("Og", -1.0),
];

static ELEMENTS: [Element; 118] = [
    Element::H, Element::He, Element::Li, Element::Be, Element::B, Element::C,
    Element::N, Element::O, Element::F, Element::Ne, Element::Na, Element::Mg,
    Element::Al, Element::Si, Element::P, Element::S, Element::Cl, Element::Ar,
    Element::K, Element::Ca, Element::Sc, Element::Ti, Element::V, Element::Cr,
    Element::Mn, Element::Fe, Element::Co, Element::Ni, Element::Cu, Element::Zn,
    Element::Ga, Element::Ge, Element::As, Element::Se, Element::Br, Element::Kr,
    Element::Rb, Element::Sr, Element::Y, Element::Zr, Element::Nb, Element::Mo,
    Element::Tc, Element::Ru, Element::Rh, Element::Pd, Element::Ag, Element::Cd,
    Element::In, Element::Sn, Element::Sb, Element::Te, Element::I, Element::Xe,
    Element::Cs, Element::Ba, Element::La, Element::Ce, Element::Pr, Element::Nd,
    Element::Pm, Element::Sm, Element::Eu, Element::Gd, Element::Tb, Element::Dy,
    Element::Ho, Element::Er, Element::Tm, Element::Yb, Element::Lu, Element::Hf,
    Element::Ta, Element::W, Element::Re, Element::Os, Element::Ir, Element::Pt,
    Element::Au, Element::Hg, Element::Tl, Element::Pb, Element::Bi, Element::Po,
    Element::At, Element::Rn, Element::Fr, Element::Ra, Element::Ac, Element::Th,
    Element::Pa, Element::U, Element::Np, Element::Pu, Element::Am, Element::Cm,
    Element::Bk, Element::Cf, Element::Es, Element::Fm, Element::Md, Element::No,
    Element::Lr, Element::Rf, Element::Db, Element::Sg, Element::Bh, Element::Hs,
    Element::Mt, Element::Ds, Element::Rg, Element::Cn, Element::Nh, Element::Fl,
    Element::Mc, Element::Lv, Element::Ts, Element::Og,
];
// Valence-shell electrons, indexed by atomic number (slot 0 is the dummy atom).
static OUTER_ELECTRONS: [u8; 119] = [
    0,  // dummy
    1, 2,                                                       // H  He
    1, 2, 3, 4, 5, 6, 7, 8,                                    // Li Be B  C  N  O  F  Ne
    1, 2, 3, 4, 5, 6, 7, 8,                                    // Na Mg Al Si P  S  Cl Ar
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8, // K  Ca Sc..Zn Ga Ge As Se Br Kr
    1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8, // Rb Sr Y ..Cd In Sn Sb Te I  Xe
    1, 2,                                                       // Cs Ba
    3, 4, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14,            // La Ce..Yb
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8,       // Lu Hf..Hg Tl Pb Bi Po At Rn
    1, 2,                                                       // Fr Ra
    3, 4, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14,            // Ac Th..No
    3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 3, 4, 5, 6, 7, 8,       // Lr Rf..Cn Nh Fl Mc Lv Ts Og
];
