//! Fixed Reference Data
//!
//! Category list and team directory used by the selector suggestions.
//! These are suggestion surfaces only; submitted values stay free text.

/// 공종 (trade category) names
pub const CATEGORIES: &[&str] = &[
    "공통사항",
    "가설사무실",
    "가설펜스",
    "안전시설물공사",
    "균열보수공사",
    "마감용비계공사",
    "영구배수공사",
    "배수판공사",
    "보강토옹벽공사",
    "조경공사",
    "조경시설물",
    "방음벽공사",
    "교통시설물공사",
    "건축토공사",
    "파일공사",
    "부대토목공사",
    "산석옹벽공사",
    "철근콘크리트공사",
    "철골공사",
    "흠음뿜칠공사",
    "데크공사",
    "습식공사",
    "방수공사",
    "코킹공사",
    "석공사",
    "도배공사",
    "인테리어공사",
    "내장목공사",
    "목창호",
    "유리공사",
    "AL창호공사",
    "도장공사",
    "일반철물공사",
    "특화철물공사",
    "자동문공사",
    "난간대공사",
    "현관방화문",
    "AL중문공사",
    "전기공사",
    "설비공사",
];

/// One row of the team directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TeamMember {
    pub name: &'static str,
    pub department: &'static str,
    pub email: &'static str,
}

pub const TEAM_MEMBERS: &[TeamMember] = &[
    TeamMember { name: "이길재", department: "건축외주팀", email: "gilee05@gsenc.com" },
    TeamMember { name: "강성현", department: "건축외주팀", email: "shkang5@gsenc.com" },
    TeamMember { name: "김민석", department: "건축외주팀", email: "mskim32@gsenc.com" },
    TeamMember { name: "김수남", department: "건축외주팀", email: "snkim@gsenc.com" },
    TeamMember { name: "김진아", department: "건축외주팀", email: "jakim@gsenc.com" },
    TeamMember { name: "김태윤", department: "건축외주팀", email: "tykim05@gsenc.com" },
    TeamMember { name: "박성민", department: "건축외주팀", email: "smpark100@gsenc.com" },
    TeamMember { name: "박영민", department: "건축외주팀", email: "ympark@gsenc.com" },
    TeamMember { name: "성준엽", department: "건축외주팀", email: "jysung01@gsenc.com" },
    TeamMember { name: "이병길", department: "건축외주팀", email: "bklee01@gsenc.com" },
    TeamMember { name: "임혜진", department: "건축외주팀", email: "hj@gsenc.com" },
    TeamMember { name: "정재영", department: "건축외주팀", email: "jyjeong9@gsenc.com" },
    TeamMember { name: "조경록", department: "건축외주팀", email: "krcho@gsenc.com" },
    TeamMember { name: "조아림", department: "건축외주팀", email: "arjo@gsenc.com" },
    TeamMember { name: "한현민", department: "건축외주팀", email: "hmhan@gsenc.com" },
];
